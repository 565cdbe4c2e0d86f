use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderMap, CONTENT_LENGTH};
use hyper::{Response, StatusCode};
use crate::charset;
use crate::filter::FilterError;
use super::{ByteStream, HttpResponse, OutputBuffer, TextWriter};

/// 실제 전송 계층으로 나가는 응답
///
/// 본문은 교환이 끝날 때 [`TransportResponse::into_response`] 로 한 번만 만들어집니다.
/// 실패한 교환에서는 그대로 버려지므로 부분 응답이 나가지 않습니다.
#[derive(Debug)]
pub struct TransportResponse {
    status: StatusCode,
    headers: HeaderMap,
    buffer: OutputBuffer,
}

impl TransportResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            buffer: OutputBuffer::default(),
        }
    }

    pub fn into_response(mut self) -> Response<Full<Bytes>> {
        let encoding = charset::resolve(self.content_type());
        self.buffer.flush_text(encoding);

        // 본문 길이는 hyper 가 실제 본문으로부터 계산한다
        self.headers.remove(CONTENT_LENGTH);

        let mut response = Response::new(Full::new(self.buffer.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for TransportResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpResponse for TransportResponse {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn writer(&mut self) -> Result<TextWriter<'_>, FilterError> {
        self.buffer.writer()
    }

    fn output_stream(&mut self) -> Result<ByteStream<'_>, FilterError> {
        self.buffer.output_stream()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use std::fmt::Write as _;

    #[tokio::test]
    async fn test_into_response_encodes_pending_text() {
        let mut res = TransportResponse::new();
        res.set_status(StatusCode::CREATED);
        res.set_content_type("text/plain; charset=euc-kr").unwrap();
        res.headers_mut().insert(CONTENT_LENGTH, "999".parse().unwrap());
        write!(res.writer().unwrap(), "안녕").unwrap();

        let response = res.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(response.headers().get(CONTENT_LENGTH).is_none());

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let (expected, _, _) = encoding_rs::EUC_KR.encode("안녕");
        assert_eq!(&body[..], &expected[..]);
    }
}
