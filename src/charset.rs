use std::borrow::Cow;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use tracing::warn;
use crate::filter::FilterError;

/// Content-Type 값에서 `charset` 파라미터를 추출합니다.
///
/// `text/html; charset="EUC-KR"` 처럼 따옴표로 감싼 값도 허용합니다.
pub fn charset_param(content_type: &str) -> Option<&str> {
    content_type
        .split(';')
        .skip(1)
        .find_map(|param| {
            let (name, value) = param.split_once('=')?;
            if name.trim().eq_ignore_ascii_case("charset") {
                Some(value.trim().trim_matches('"'))
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty())
}

/// 인코딩 라벨을 엄격하게 해석합니다. 알 수 없는 라벨이면 에러를 반환합니다.
pub fn parse_strict(label: &str) -> Result<&'static Encoding, FilterError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| FilterError::Encoding(label.to_string()))
}

/// Content-Type 에 선언된 인코딩을 결정합니다.
///
/// 선언이 없으면 UTF-8, 알 수 없는 라벨이면 경고를 남기고 UTF-8 로 대체합니다.
pub fn resolve(content_type: Option<&str>) -> &'static Encoding {
    let Some(label) = content_type.and_then(charset_param) else {
        return UTF_8;
    };

    match parse_strict(label) {
        Ok(encoding) => encoding,
        Err(e) => {
            warn!(error = %e, "알 수 없는 문자 인코딩, UTF-8 로 대체합니다");
            UTF_8
        }
    }
}

/// 텍스트를 `encoding` 바이트로 바꿉니다.
///
/// `encoding_rs` 의 인코더는 UTF-16 을 UTF-8 로 내보내므로 UTF-16LE/BE 는 직접 인코딩합니다.
pub fn encode<'a>(encoding: &'static Encoding, text: &'a str) -> Cow<'a, [u8]> {
    if encoding == UTF_16LE {
        Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
    } else if encoding == UTF_16BE {
        Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect())
    } else {
        encoding.encode(text).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_param() {
        assert_eq!(charset_param("text/html; charset=utf-8"), Some("utf-8"));
        assert_eq!(charset_param("text/plain;Charset=\"EUC-KR\""), Some("EUC-KR"));
        assert_eq!(charset_param("application/json"), None);
        assert_eq!(charset_param("text/plain; charset="), None);
    }

    #[test]
    fn test_resolve_defaults_to_utf8() {
        assert_eq!(resolve(None), UTF_8);
        assert_eq!(resolve(Some("text/plain")), UTF_8);
        assert_eq!(resolve(Some("text/plain; charset=no-such-charset")), UTF_8);
    }

    #[test]
    fn test_resolve_declared_encoding() {
        assert_eq!(resolve(Some("text/plain; charset=euc-kr")), encoding_rs::EUC_KR);
        assert!(parse_strict("bogus").is_err());
    }

    #[test]
    fn test_encode_round_trips_through_declared_charset() {
        for encoding in [UTF_8, UTF_16LE, UTF_16BE, encoding_rs::EUC_KR] {
            let bytes = encode(encoding, "<p>안녕 hi</p>");
            let (decoded, had_errors) = encoding.decode_without_bom_handling(&bytes);
            assert!(!had_errors, "{}", encoding.name());
            assert_eq!(decoded, "<p>안녕 hi</p>");
        }
        assert_eq!(&encode(UTF_16LE, "a")[..], &[0x61, 0x00]);
        assert_eq!(&encode(UTF_16BE, "a")[..], &[0x00, 0x61]);
    }
}
