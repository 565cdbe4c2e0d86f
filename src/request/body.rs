use std::borrow::Cow;
use std::io::{self, Cursor};
use bytes::Bytes;
use encoding_rs::Encoding;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use crate::filter::{BoxError, FilterError};

/// 한 번 읽어 둔 요청 본문
///
/// 모든 뷰는 같은 바이트 위에 새 커서를 만들기 때문에 몇 번을 읽어도 서로 간섭하지 않습니다.
#[derive(Debug, Clone)]
pub struct BufferedBody {
    bytes: Bytes,
    encoding: &'static Encoding,
}

impl BufferedBody {
    pub fn new(bytes: impl Into<Bytes>, encoding: &'static Encoding) -> Self {
        Self {
            bytes: bytes.into(),
            encoding,
        }
    }

    /// 원본 본문을 끝까지 읽습니다.
    ///
    /// 선언된 `Content-Length` 보다 적게 도착하면 잘린 스트림으로 보고 실패합니다.
    pub async fn read_from<B>(
        body: B,
        encoding: &'static Encoding,
        declared_length: Option<u64>,
    ) -> Result<Self, FilterError>
    where
        B: Body,
        B::Error: Into<BoxError>,
    {
        let bytes = body
            .collect()
            .await
            .map_err(|e| FilterError::BodyRead(e.into()))?
            .to_bytes();

        if let Some(declared) = declared_length {
            if (bytes.len() as u64) < declared {
                return Err(FilterError::BodyRead(Box::new(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("본문이 잘렸습니다: 선언 {} bytes, 수신 {} bytes", declared, bytes.len()),
                ))));
            }
        }

        Ok(Self::new(bytes, encoding))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn charset(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// 본문 바이트. `Bytes` 복제는 참조 카운트만 증가시킵니다.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// 바이트 스트림 뷰
    pub fn input_stream(&self) -> Cursor<Bytes> {
        Cursor::new(self.bytes.clone())
    }

    /// 요청 charset 으로 디코딩한 텍스트
    pub fn text(&self) -> Cow<'_, str> {
        self.encoding.decode_without_bom_handling(&self.bytes).0
    }

    /// 디코딩된 문자 스트림 뷰
    pub fn reader(&self) -> Cursor<String> {
        Cursor::new(self.text().into_owned())
    }

    /// 하위 hyper 서비스에 넘길 본문
    pub fn to_body(&self) -> Full<Bytes> {
        Full::new(self.bytes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Read};

    #[test]
    fn test_views_are_independent() {
        let body = BufferedBody::new("line1\nline2", encoding_rs::UTF_8);

        let mut first = body.input_stream();
        let mut head = [0u8; 3];
        first.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"lin");

        // 앞선 커서가 중간에 멈춰 있어도 새 뷰는 처음부터 읽는다
        let lines: Vec<String> = body.reader().lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["line1", "line2"]);

        let mut rest = Vec::new();
        first.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"e1\nline2");
    }

    #[test]
    fn test_replay_any_interleaving() {
        let body = BufferedBody::new("name=Kim&age=30", encoding_rs::UTF_8);

        for round in 0..4 {
            let mut bytes = Vec::new();
            body.input_stream().read_to_end(&mut bytes).unwrap();
            assert_eq!(bytes, b"name=Kim&age=30", "byte view round {}", round);

            let mut text = String::new();
            body.reader().read_to_string(&mut text).unwrap();
            assert_eq!(text, "name=Kim&age=30", "char view round {}", round);
        }
        assert_eq!(body.len(), 15);
    }

    #[test]
    fn test_text_uses_declared_charset() {
        let (encoded, _, _) = encoding_rs::EUC_KR.encode("김철수");
        let body = BufferedBody::new(encoded.into_owned(), encoding_rs::EUC_KR);
        assert_eq!(body.text(), "김철수");
        assert_eq!(body.charset(), encoding_rs::EUC_KR);
    }

    #[tokio::test]
    async fn test_read_from_rejects_truncated_body() {
        let result = BufferedBody::read_from(
            Full::new(Bytes::from_static(b"abc")),
            encoding_rs::UTF_8,
            Some(10),
        )
        .await;
        assert!(matches!(result, Err(FilterError::BodyRead(_))));

        let body = BufferedBody::read_from(
            Full::new(Bytes::from_static(b"abc")),
            encoding_rs::UTF_8,
            Some(3),
        )
        .await
        .unwrap();
        assert_eq!(body.as_bytes(), b"abc");
    }
}
