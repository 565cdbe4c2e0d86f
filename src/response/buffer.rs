use bytes::{Bytes, BytesMut};
use encoding_rs::Encoding;
use crate::charset;
use crate::filter::FilterError;
use super::{ByteStream, TextWriter, WriteSurface};

/// 응답 본문 버퍼. 추가만 가능합니다.
#[derive(Debug, Default)]
pub(crate) struct OutputBuffer {
    bytes: BytesMut,
    pending: String,
    surface: Option<WriteSurface>,
}

impl OutputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: BytesMut::with_capacity(capacity),
            pending: String::new(),
            surface: None,
        }
    }

    pub fn surface(&self) -> Option<WriteSurface> {
        self.surface
    }

    fn select(&mut self, requested: WriteSurface) -> Result<(), FilterError> {
        match self.surface {
            None => {
                self.surface = Some(requested);
                Ok(())
            }
            Some(active) if active == requested => Ok(()),
            Some(active) => Err(FilterError::WriteSurfaceMisuse { requested, active }),
        }
    }

    pub fn writer(&mut self) -> Result<TextWriter<'_>, FilterError> {
        self.select(WriteSurface::Writer)?;
        Ok(TextWriter::new(&mut self.pending))
    }

    pub fn output_stream(&mut self) -> Result<ByteStream<'_>, FilterError> {
        self.select(WriteSurface::Stream)?;
        Ok(ByteStream::new(&mut self.bytes))
    }

    /// 대기 중인 문자 출력을 바이트로 인코딩해 버퍼에 반영합니다.
    pub fn flush_text(&mut self, encoding: &'static Encoding) {
        if self.pending.is_empty() {
            return;
        }
        self.bytes.extend_from_slice(&charset::encode(encoding, &self.pending));
        self.pending.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn freeze(self) -> Bytes {
        self.bytes.freeze()
    }
}
