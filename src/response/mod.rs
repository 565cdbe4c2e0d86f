//! 응답 출력 모델
//!
//! 핸들러는 [`HttpResponse`] 를 통해 상태, 헤더를 설정하고 두 가지 출력 방식 중
//! 하나로 본문을 씁니다.
//!
//! - [`TextWriter`]: 문자 단위 출력. 응답의 charset 으로 인코딩됩니다.
//! - [`ByteStream`]: 바이트 단위 출력. 그대로 기록됩니다.
//!
//! 한 응답에서는 처음 요청한 출력 방식만 사용할 수 있습니다.

mod buffer;
mod capture;
mod transport;

pub use capture::{CapturedBody, ResponseCapture};
pub use transport::TransportResponse;

pub(crate) use buffer::OutputBuffer;

use std::fmt;
use std::io;
use bytes::BytesMut;
use hyper::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use hyper::StatusCode;
use crate::filter::FilterError;

/// 본문 출력 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteSurface {
    Writer,
    Stream,
}

impl fmt::Display for WriteSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Writer => write!(f, "writer"),
            Self::Stream => write!(f, "output stream"),
        }
    }
}

/// 나가는 응답에 대한 공통 인터페이스
pub trait HttpResponse: Send {
    fn status(&self) -> StatusCode;

    fn set_status(&mut self, status: StatusCode);

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// 문자 출력 방식을 요청합니다.
    fn writer(&mut self) -> Result<TextWriter<'_>, FilterError>;

    /// 바이트 출력 방식을 요청합니다.
    fn output_stream(&mut self) -> Result<ByteStream<'_>, FilterError>;

    fn content_type(&self) -> Option<&str> {
        self.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    fn set_content_type(&mut self, content_type: &str) -> Result<(), FilterError> {
        let value = HeaderValue::from_str(content_type)
            .map_err(|e| FilterError::Handler(format!("잘못된 Content-Type '{}': {}", content_type, e)))?;
        self.headers_mut().insert(CONTENT_TYPE, value);
        Ok(())
    }
}

/// 문자 출력. 쓰여진 텍스트는 flush 시점에 응답 charset 으로 인코딩됩니다.
pub struct TextWriter<'a> {
    pending: &'a mut String,
}

impl<'a> TextWriter<'a> {
    pub(crate) fn new(pending: &'a mut String) -> Self {
        Self { pending }
    }

    pub fn push_str(&mut self, text: &str) {
        self.pending.push_str(text);
    }
}

impl fmt::Write for TextWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

/// 바이트 출력
pub struct ByteStream<'a> {
    bytes: &'a mut BytesMut,
}

impl<'a> ByteStream<'a> {
    pub(crate) fn new(bytes: &'a mut BytesMut) -> Self {
        Self { bytes }
    }
}

impl io::Write for ByteStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
