// 정규식 리터럴이 올 수 있는 직전 문자
const REGEX_PRECEDERS: &[u8] = b"(,=:[!&|?{};+-*%<>~^";
const REGEX_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "case", "do", "else", "in", "of", "new", "delete", "void",
    "throw", "yield", "await",
];

/// 줄 단위 JavaScript 압축
///
/// 줄바꿈은 자동 세미콜론 삽입에 영향을 주므로 유지합니다. 리터럴 밖에서만 줄 앞뒤 공백,
/// 연속 공백, 빈 줄, 주석을 제거하고 문자열, 템플릿, 정규식 리터럴은 그대로 복사합니다.
/// `/*!` 로 시작하는 주석은 남깁니다.
#[derive(Debug, Clone, Default)]
pub struct JsMinifier;

impl JsMinifier {
    pub fn new() -> Self {
        Self
    }

    pub fn minify(&self, input: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = Output::default();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    out.newline();
                    i += 1;
                }
                b if b.is_ascii_whitespace() => {
                    out.space();
                    i += 1;
                }
                b'\'' | b'"' => {
                    let end = string_end(bytes, i);
                    out.push(&input[i..end]);
                    i = end;
                }
                b'`' => {
                    let end = template_end(bytes, i);
                    out.push(&input[i..end]);
                    i = end;
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    i = input[i..].find('\n').map_or(bytes.len(), |pos| i + pos);
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    let end = input[i + 2..].find("*/").map_or(bytes.len(), |pos| i + 2 + pos + 2);
                    let comment = &input[i..end];
                    if comment.starts_with("/*!") {
                        out.push(comment);
                    } else if comment.contains('\n') {
                        out.newline();
                    } else {
                        out.space();
                    }
                    i = end;
                }
                b'/' if out.regex_allowed() => match regex_end(bytes, i) {
                    Some(end) => {
                        out.push(&input[i..end]);
                        i = end;
                    }
                    None => {
                        out.push("/");
                        i += 1;
                    }
                },
                _ => {
                    let len = input[i..].chars().next().map_or(1, char::len_utf8);
                    out.push(&input[i..i + len]);
                    i += len;
                }
            }
        }

        out.finish()
    }
}

/// 압축 결과. 코드가 있는 줄만 남기고 줄 안의 공백은 하나로 줄인다.
#[derive(Default)]
struct Output {
    text: String,
    line_has_code: bool,
    pending_space: bool,
}

impl Output {
    fn push(&mut self, code: &str) {
        if self.pending_space && self.line_has_code {
            self.text.push(' ');
        }
        self.pending_space = false;
        self.text.push_str(code);
        self.line_has_code = true;
    }

    fn space(&mut self) {
        if self.line_has_code {
            self.pending_space = true;
        }
    }

    fn newline(&mut self) {
        if self.line_has_code {
            self.text.push('\n');
            self.line_has_code = false;
        }
        self.pending_space = false;
    }

    fn regex_allowed(&self) -> bool {
        let code = self.text.trim_end();
        let Some(&last) = code.as_bytes().last() else {
            return true;
        };
        if REGEX_PRECEDERS.contains(&last) {
            return true;
        }

        let before_word = code.trim_end_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        REGEX_KEYWORDS.contains(&&code[before_word.len()..])
    }

    fn finish(self) -> String {
        self.text.trim_end_matches('\n').to_string()
    }
}

// 닫히지 않은 문자열은 줄 끝에서 멈춘다
fn string_end(bytes: &[u8], start: usize) -> usize {
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

fn template_end(bytes: &[u8], start: usize) -> usize {
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'`' => return j + 1,
            b'$' if bytes.get(j + 1) == Some(&b'{') => j = placeholder_end(bytes, j + 2),
            _ => j += 1,
        }
    }
    bytes.len()
}

// `${ ... }` 안쪽. 중첩된 문자열과 템플릿을 건너뛴다
fn placeholder_end(bytes: &[u8], start: usize) -> usize {
    let mut depth = 1;
    let mut j = start;
    while j < bytes.len() {
        match bytes[j] {
            b'{' => {
                depth += 1;
                j += 1;
            }
            b'}' => {
                depth -= 1;
                j += 1;
                if depth == 0 {
                    return j;
                }
            }
            b'\'' | b'"' => j = string_end(bytes, j),
            b'`' => j = template_end(bytes, j),
            _ => j += 1,
        }
    }
    bytes.len()
}

// 같은 줄에서 닫히지 않으면 나눗셈으로 본다
fn regex_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut in_class = false;
    let mut j = start + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 1,
            b'\n' => return None,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => return Some(j + 1),
            _ => {}
        }
        j += 1;
    }
    None
}
