use std::borrow::Cow;
use std::io;
use bytes::Bytes;
use encoding_rs::Encoding;
use hyper::header::HeaderMap;
use hyper::StatusCode;
use tracing::trace;
use crate::charset;
use crate::filter::FilterError;
use super::{ByteStream, HttpResponse, OutputBuffer, TextWriter, WriteSurface};

const INITIAL_CAPACITY: usize = 8 * 1024;

/// 핸들러 출력을 메모리에 모으는 응답 래퍼
///
/// 상태, 헤더, Content-Type 은 감싼 응답에 그대로 위임하고 본문만 가로챕니다.
/// 캡처가 drop 되면 버퍼도 해제되며, 이후 쓰기는 [`FilterError::CaptureReleased`] 로 실패합니다.
pub struct ResponseCapture<'a> {
    inner: &'a mut dyn HttpResponse,
    buffer: Option<OutputBuffer>,
}

impl<'a> ResponseCapture<'a> {
    pub fn new(inner: &'a mut dyn HttpResponse) -> Self {
        Self {
            inner,
            buffer: Some(OutputBuffer::with_capacity(INITIAL_CAPACITY)),
        }
    }

    fn encoding(&self) -> &'static Encoding {
        charset::resolve(self.inner.content_type())
    }

    fn buffer_mut(&mut self) -> Result<&mut OutputBuffer, FilterError> {
        self.buffer.as_mut().ok_or(FilterError::CaptureReleased)
    }

    /// 핸들러가 선택한 출력 방식
    pub fn surface(&self) -> Option<WriteSurface> {
        self.buffer.as_ref().and_then(OutputBuffer::surface)
    }

    pub fn is_released(&self) -> bool {
        self.buffer.is_none()
    }

    /// 캡처된 내용을 텍스트로 반환합니다. 대기 중인 문자 출력을 먼저 반영합니다.
    pub fn text(&mut self) -> Result<String, FilterError> {
        let encoding = self.encoding();
        let buffer = self.buffer_mut()?;
        buffer.flush_text(encoding);
        Ok(encoding.decode_without_bom_handling(buffer.as_bytes()).0.into_owned())
    }

    /// 캡처된 바이트를 그대로 복사합니다.
    pub fn write_to<W: io::Write>(&mut self, out: &mut W) -> Result<(), FilterError> {
        let encoding = self.encoding();
        let buffer = self.buffer_mut()?;
        buffer.flush_text(encoding);
        out.write_all(buffer.as_bytes())?;
        Ok(())
    }

    /// 캡처를 마감하고 불변 본문을 꺼냅니다. 버퍼는 캡처에서 분리됩니다.
    pub fn finish(mut self) -> Result<CapturedBody, FilterError> {
        let encoding = self.encoding();
        let mut buffer = self.buffer.take().ok_or(FilterError::CaptureReleased)?;
        buffer.flush_text(encoding);

        Ok(CapturedBody {
            content_type: self.inner.content_type().unwrap_or_default().to_string(),
            encoding,
            bytes: buffer.freeze(),
        })
    }

    /// 버퍼를 버립니다.
    pub fn release(&mut self) {
        if self.buffer.take().is_some() {
            trace!("응답 캡처 버퍼 해제");
        }
    }
}

impl Drop for ResponseCapture<'_> {
    fn drop(&mut self) {
        self.release();
    }
}

impl HttpResponse for ResponseCapture<'_> {
    fn status(&self) -> StatusCode {
        self.inner.status()
    }

    fn set_status(&mut self, status: StatusCode) {
        self.inner.set_status(status);
    }

    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn writer(&mut self) -> Result<TextWriter<'_>, FilterError> {
        self.buffer_mut()?.writer()
    }

    fn output_stream(&mut self) -> Result<ByteStream<'_>, FilterError> {
        self.buffer_mut()?.output_stream()
    }
}

/// 마감된 캡처 본문. 분기 처리기가 한 번 소비합니다.
#[derive(Debug)]
pub struct CapturedBody {
    content_type: String,
    encoding: &'static Encoding,
    bytes: Bytes,
}

impl CapturedBody {
    /// 핸들러가 선언한 Content-Type, 없으면 빈 문자열
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn text(&self) -> Cow<'_, str> {
        self.encoding.decode_without_bom_handling(&self.bytes).0
    }
}
