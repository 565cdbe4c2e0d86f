use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;
use crate::dispatch::ContentDispatcher;
use crate::minify::{ContentMinifier, Minifier, MinifyOptions};
use crate::request::InterceptedRequest;
use crate::response::{HttpResponse, ResponseCapture};
use super::{Filter, FilterError, Next};

/// HTML, JavaScript, CSS 응답 압축 필터
///
/// 하위 체인의 출력을 [`ResponseCapture`] 로 모은 뒤 Content-Type 에 따라
/// 그대로, 텍스트로, 또는 압축해서 내보냅니다.
pub struct MinifyFilter {
    dispatcher: ContentDispatcher,
}

impl MinifyFilter {
    pub fn new(options: MinifyOptions) -> Result<Self, FilterError> {
        let minifier = ContentMinifier::new(options)
            .map_err(|e| FilterError::Config(format!("minify 필터 생성 실패: {}", e)))?;
        Ok(Self::with_minifier(Arc::new(minifier)))
    }

    pub fn with_minifier(minifier: Arc<dyn Minifier>) -> Self {
        Self {
            dispatcher: ContentDispatcher::new(minifier),
        }
    }
}

#[async_trait]
impl Filter for MinifyFilter {
    fn name(&self) -> &str {
        "minify"
    }

    async fn do_filter(
        &self,
        req: &InterceptedRequest,
        res: &mut dyn HttpResponse,
        next: Next<'_>,
    ) -> Result<(), FilterError> {
        // 에러로 빠져나가도 캡처는 drop 되며 버퍼가 해제된다
        let captured = {
            let mut capture = ResponseCapture::new(&mut *res);
            next.run(req, &mut capture).await?;
            capture.finish()?
        };

        let disposition = self.dispatcher.dispatch(captured, res)?;
        debug!(?disposition, path = %req.path(), "응답 내보내기 완료");
        Ok(())
    }
}
