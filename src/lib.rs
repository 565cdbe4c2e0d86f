//! Web Filters는 HTTP 요청/응답 교환을 여러 필터 단계가 관찰하고 고쳐 쓸 수 있게 해 주는
//! 미들웨어 파이프라인입니다.
//!
//! # 주요 기능
//!
//! - 요청 본문을 한 번만 읽고 여러 번 재생 ([`request::InterceptedRequest`])
//! - 핸들러 출력을 메모리에 캡처 ([`response::ResponseCapture`])
//! - Content-Type 기반 분기 및 HTML/CSS/JavaScript 압축 ([`dispatch::ContentDispatcher`])
//! - 요청 시작/종료 구조화 로깅 ([`exchange_log::ExchangeLogger`])
//!
//! # 예제
//!
//! ```
//! use web_filters::dispatch::{classify, ContentKind};
//!
//! assert_eq!(classify("text/html; charset=utf-8"), ContentKind::Compressible);
//! assert_eq!(classify("application/json"), ContentKind::Text);
//! assert_eq!(classify("image/png"), ContentKind::Binary);
//! ```
//!
//! # 필터 체인
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use web_filters::filter::{FilterChain, FilterError, Handler, MinifyFilter};
//! use web_filters::minify::MinifyOptions;
//! use web_filters::request::InterceptedRequest;
//! use web_filters::response::HttpResponse;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, _req: &InterceptedRequest, res: &mut dyn HttpResponse) -> Result<(), FilterError> {
//!         res.set_content_type("text/html")?;
//!         res.writer()?.push_str("<p>   hello   </p>");
//!         Ok(())
//!     }
//! }
//!
//! let mut chain = FilterChain::new(Arc::new(Hello));
//! chain.add(MinifyFilter::new(MinifyOptions::default()).unwrap());
//! assert_eq!(chain.filter_names(), vec!["minify"]);
//! ```

pub mod charset;
pub mod dispatch;
pub mod exchange_log;
pub mod filter;
pub mod logging;
pub mod minify;
pub mod request;
pub mod response;
pub mod server;
pub mod settings;
