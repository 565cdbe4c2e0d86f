use async_trait::async_trait;
use crate::exchange_log::ExchangeLogger;
use crate::request::InterceptedRequest;
use crate::response::HttpResponse;
use super::{Filter, FilterError, Next};

/// 요청 시작/종료를 기록하는 필터
///
/// `with_body` 로 만든 로거를 쓰면 시작 기록에 요청 본문도 남깁니다.
/// 본문은 이미 버퍼링되어 있으므로 뒤따르는 핸들러도 같은 본문을 다시 읽을 수 있습니다.
pub struct LoggingFilter {
    logger: ExchangeLogger,
}

impl LoggingFilter {
    pub fn new(logger: ExchangeLogger) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl Filter for LoggingFilter {
    fn name(&self) -> &str {
        if self.logger.includes_body() {
            "request-logging"
        } else {
            "logging"
        }
    }

    async fn do_filter(
        &self,
        req: &InterceptedRequest,
        res: &mut dyn HttpResponse,
        next: Next<'_>,
    ) -> Result<(), FilterError> {
        let timer = self.logger.log_entry(req);
        next.run(req, res).await?;
        self.logger.log_exit(req, timer, res.status());
        Ok(())
    }
}
