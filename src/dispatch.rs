//! 캡처된 응답의 최종 처리
//!
//! 분류는 선언된 Content-Type 문자열만 보고 결정합니다. 실제 바이트를 들여다보지 않습니다.
//!
//! | Content-Type | 분류 |
//! |---|---|
//! | 빈 값, `text`/`json`/`xml` 포함 | 텍스트 |
//! | 텍스트 중 `html`/`xml`/`javascript`/`css` 포함 | 압축 대상 |
//! | 그 밖의 값 (`image/png`, `application/octet-stream`, `application/javascript` 등) | 바이너리 |

use std::io::Write;
use std::sync::Arc;
use tracing::{debug, warn};
use crate::filter::FilterError;
use crate::minify::Minifier;
use crate::response::{CapturedBody, HttpResponse};

const TEXTUAL_KEYWORDS: [&str; 3] = ["text", "json", "xml"];
const COMPRESSIBLE_KEYWORDS: [&str; 4] = ["html", "xml", "javascript", "css"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// 손대지 않고 바이트 그대로 내보낸다
    Binary,
    /// 텍스트 그대로 내보낸다
    Text,
    /// 압축 후 내보낸다
    Compressible,
}

/// 최종 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    PassThrough,
    Text,
    Minified,
    /// 압축에 실패해 원문 텍스트를 내보냈다
    Degraded,
}

pub fn classify(content_type: &str) -> ContentKind {
    let content_type = content_type.to_ascii_lowercase();

    let textual = content_type.is_empty()
        || TEXTUAL_KEYWORDS.iter().any(|keyword| content_type.contains(keyword));
    if !textual {
        return ContentKind::Binary;
    }

    if COMPRESSIBLE_KEYWORDS.iter().any(|keyword| content_type.contains(keyword)) {
        ContentKind::Compressible
    } else {
        ContentKind::Text
    }
}

/// 캡처된 본문을 분류하고 실제 응답으로 내보냅니다.
#[derive(Clone)]
pub struct ContentDispatcher {
    minifier: Arc<dyn Minifier>,
}

impl ContentDispatcher {
    pub fn new(minifier: Arc<dyn Minifier>) -> Self {
        Self { minifier }
    }

    /// 압축 실패는 교환을 실패시키지 않습니다. 경고를 남기고 원문을 내보냅니다.
    pub fn dispatch(
        &self,
        captured: CapturedBody,
        out: &mut dyn HttpResponse,
    ) -> Result<Disposition, FilterError> {
        let kind = classify(captured.content_type());
        debug!(
            content_type = %captured.content_type(),
            ?kind,
            bytes = captured.len(),
            "캡처된 응답 분류"
        );

        match kind {
            ContentKind::Binary => {
                out.output_stream()?.write_all(captured.bytes())?;
                Ok(Disposition::PassThrough)
            }
            ContentKind::Text => {
                out.writer()?.push_str(&captured.text());
                Ok(Disposition::Text)
            }
            ContentKind::Compressible => {
                let text = captured.text();
                match self.minifier.minify(&text, captured.content_type()) {
                    Ok(minified) => {
                        debug!(before = text.len(), after = minified.len(), "응답 압축 완료");
                        out.writer()?.push_str(&minified);
                        Ok(Disposition::Minified)
                    }
                    Err(e) => {
                        warn!(
                            error = %FilterError::from(e),
                            content_type = %captured.content_type(),
                            "응답 압축 실패, 원문을 그대로 내보냅니다"
                        );
                        out.writer()?.push_str(&text);
                        Ok(Disposition::Degraded)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minify::{ContentMinifier, MinifyError, MinifyOptions};
    use crate::response::{ResponseCapture, TransportResponse};
    use http_body_util::BodyExt;
    use std::fmt::Write as _;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];

    struct FailingMinifier;

    impl Minifier for FailingMinifier {
        fn minify(&self, _content: &str, _content_type: &str) -> Result<String, MinifyError> {
            Err(MinifyError::UnclosedComment)
        }
    }

    fn dispatcher() -> ContentDispatcher {
        ContentDispatcher::new(Arc::new(ContentMinifier::new(MinifyOptions::default()).unwrap()))
    }

    fn capture_text(inner: &mut TransportResponse, content_type: &str, text: &str) -> CapturedBody {
        let mut capture = ResponseCapture::new(inner);
        if !content_type.is_empty() {
            capture.set_content_type(content_type).unwrap();
        }
        capture.writer().unwrap().write_str(text).unwrap();
        capture.finish().unwrap()
    }

    async fn body_of(res: TransportResponse) -> Vec<u8> {
        res.into_response().into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify(""), ContentKind::Text);
        assert_eq!(classify("application/json"), ContentKind::Text);
        assert_eq!(classify("text/plain"), ContentKind::Text);
        assert_eq!(classify("image/png"), ContentKind::Binary);
        assert_eq!(classify("application/octet-stream"), ContentKind::Binary);
        assert_eq!(classify("text/html; charset=utf-8"), ContentKind::Compressible);
        assert_eq!(classify("TEXT/CSS"), ContentKind::Compressible);
        assert_eq!(classify("application/xml"), ContentKind::Compressible);
        // 텍스트 키워드가 하나라도 있으면 텍스트 쪽으로 분류
        assert_eq!(classify("image/svg+xml"), ContentKind::Compressible);
    }

    #[tokio::test]
    async fn test_binary_pass_through_is_exact() {
        let mut res = TransportResponse::new();
        let captured = {
            let mut capture = ResponseCapture::new(&mut res);
            capture.set_content_type("image/png").unwrap();
            capture.output_stream().unwrap().write_all(&PNG_HEADER).unwrap();
            capture.finish().unwrap()
        };

        let disposition = dispatcher().dispatch(captured, &mut res).unwrap();
        assert_eq!(disposition, Disposition::PassThrough);
        assert_eq!(body_of(res).await, PNG_HEADER.to_vec());
    }

    #[tokio::test]
    async fn test_json_is_emitted_unchanged() {
        let mut res = TransportResponse::new();
        let json = "{\n  \"ok\" :  true\n}";
        let captured = capture_text(&mut res, "application/json", json);

        assert_eq!(dispatcher().dispatch(captured, &mut res).unwrap(), Disposition::Text);
        assert_eq!(body_of(res).await, json.as_bytes().to_vec());
    }

    #[tokio::test]
    async fn test_html_is_minified() {
        let mut res = TransportResponse::new();
        let captured = capture_text(&mut res, "text/html", "<html><body>  Hello  </body></html>");

        assert_eq!(dispatcher().dispatch(captured, &mut res).unwrap(), Disposition::Minified);
        assert_eq!(body_of(res).await, b"<html><body> Hello </body></html>".to_vec());
    }

    #[tokio::test]
    async fn test_transform_failure_degrades_to_original() {
        let mut res = TransportResponse::new();
        let html = "<p>  keep   me </p>";
        let captured = capture_text(&mut res, "text/html", html);

        let dispatcher = ContentDispatcher::new(Arc::new(FailingMinifier));
        assert_eq!(dispatcher.dispatch(captured, &mut res).unwrap(), Disposition::Degraded);
        assert_eq!(body_of(res).await, html.as_bytes().to_vec());
    }
}
