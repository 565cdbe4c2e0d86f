//! 필터 체인
//!
//! 각 필터는 [`Next`] 를 호출해 다음 필터(마지막에는 핸들러)로 교환을 넘기고,
//! 호출 전후에 요청을 관찰하거나 응답을 바꿔 끼울 수 있습니다.

pub mod chain;
pub mod config;
pub mod error;
pub mod logging;
pub mod manager;
pub mod minify;
pub mod response;

pub use chain::{FilterChain, Next};
pub use config::{FilterConfig, FilterType};
pub use error::{BoxError, FilterError};
pub use logging::LoggingFilter;
pub use manager::FilterManager;
pub use minify::MinifyFilter;
pub use response::handle_filter_error;

use async_trait::async_trait;
use crate::request::InterceptedRequest;
use crate::response::HttpResponse;

/// 필터 트레이트
#[async_trait]
pub trait Filter: Send + Sync {
    /// 필터의 고유 이름을 반환합니다.
    fn name(&self) -> &str;

    /// 교환을 처리합니다. 다음 단계로 넘기려면 `next.run` 을 호출합니다.
    async fn do_filter(
        &self,
        req: &InterceptedRequest,
        res: &mut dyn HttpResponse,
        next: Next<'_>,
    ) -> Result<(), FilterError>;
}

/// 체인의 끝에서 실제 요청을 처리하는 애플리케이션 로직
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: &InterceptedRequest, res: &mut dyn HttpResponse) -> Result<(), FilterError>;
}
