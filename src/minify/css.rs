use regex_lite::Regex;
use super::MinifyError;

/// CSS 주석과 불필요한 공백 제거
///
/// 따옴표 문자열과 `url(...)` 은 그대로 두고 그 밖의 구간에만 규칙을 적용합니다.
#[derive(Debug, Clone)]
pub struct CssMinifier {
    whitespace: Regex,
    punctuation: Regex,
    colon: Regex,
}

impl CssMinifier {
    pub fn new() -> Result<Self, MinifyError> {
        Ok(Self {
            whitespace: Regex::new(r"\s+")?,
            punctuation: Regex::new(r"\s*([{};,>])\s*")?,
            colon: Regex::new(r":\s+")?,
        })
    }

    pub fn minify(&self, input: &str) -> Result<String, MinifyError> {
        let bytes = input.as_bytes();
        let mut out = String::with_capacity(input.len());
        // 주석을 걷어낸 일반 구간
        let mut plain = String::new();
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let verbatim_end = match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    plain.push_str(&input[start..i]);
                    let end = input[i + 2..]
                        .find("*/")
                        .map(|pos| i + 2 + pos + 2)
                        .ok_or(MinifyError::UnclosedComment)?;
                    i = end;
                    start = end;
                    continue;
                }
                b'"' | b'\'' => quoted_end(bytes, i),
                b'u' | b'U' if is_url_start(bytes, i) => url_end(bytes, i + 4),
                _ => {
                    i += 1;
                    continue;
                }
            };

            plain.push_str(&input[start..i]);
            out.push_str(&self.tighten(&plain));
            plain.clear();
            out.push_str(&input[i..verbatim_end]);
            i = verbatim_end;
            start = verbatim_end;
        }

        plain.push_str(&input[start..]);
        out.push_str(&self.tighten(&plain));

        Ok(out.trim().to_string())
    }

    fn tighten(&self, plain: &str) -> String {
        let collapsed = self.whitespace.replace_all(plain, " ");
        let tightened = self.punctuation.replace_all(&collapsed, "${1}");
        let tightened = self.colon.replace_all(&tightened, ":");
        tightened.replace(";}", "}")
    }
}

fn is_url_start(bytes: &[u8], i: usize) -> bool {
    bytes
        .get(i..i + 4)
        .is_some_and(|word| word.eq_ignore_ascii_case(b"url("))
}

// 닫히지 않은 문자열은 줄 끝에서 멈춘다
fn quoted_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn url_end(bytes: &[u8], mut j: usize) -> usize {
    while j < bytes.len() {
        match bytes[j] {
            b'"' | b'\'' => j = quoted_end(bytes, j),
            b')' => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}
