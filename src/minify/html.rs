use regex_lite::{Captures, Regex};
use super::{CssMinifier, JsMinifier, MinifyError, MinifyOptions};

/// HTML/XML 공백 압축기
#[derive(Debug, Clone)]
pub struct HtmlMinifier {
    options: MinifyOptions,
    css: CssMinifier,
    js: JsMinifier,
    // 내용을 따로 다루는 블록
    block: Regex,
    block_open: Regex,
    comment: Regex,
    whitespace: Regex,
}

impl HtmlMinifier {
    pub fn new(options: MinifyOptions, css: CssMinifier, js: JsMinifier) -> Result<Self, MinifyError> {
        Ok(Self {
            options,
            css,
            js,
            block: Regex::new(concat!(
                r"(?is)<pre\b[^>]*>.*?</pre\s*>",
                r"|<textarea\b[^>]*>.*?</textarea\s*>",
                r"|<script\b[^>]*>.*?</script\s*>",
                r"|<style\b[^>]*>.*?</style\s*>",
            ))?,
            block_open: Regex::new(r"(?i)<(pre|textarea|script|style)\b")?,
            comment: Regex::new(r"(?s)<!--.*?-->")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    pub fn minify(&self, input: &str) -> Result<String, MinifyError> {
        let mut out = String::with_capacity(input.len());
        let mut last = 0;

        for block in self.block.find_iter(input) {
            let markup = self.minify_markup(&input[last..block.start()])?;
            out.push_str(self.trim_intertag(&markup, last > 0, true));
            out.push_str(&self.minify_block(block.as_str()));
            last = block.end();
        }
        let markup = self.minify_markup(&input[last..])?;
        out.push_str(self.trim_intertag(&markup, last > 0, false));

        Ok(out.trim().to_string())
    }

    /// 블록과 맞닿은 태그 사이 공백. 세그먼트 단위 정규식으로는 보이지 않는다.
    fn trim_intertag<'s>(&self, markup: &'s str, after_block: bool, before_block: bool) -> &'s str {
        if !self.options.remove_intertag_spaces {
            return markup;
        }

        let mut trimmed = markup;
        if after_block && (trimmed.trim_start().starts_with('<') || trimmed.trim().is_empty()) {
            trimmed = trimmed.trim_start();
        }
        if before_block && (trimmed.trim_end().ends_with('>') || trimmed.trim().is_empty()) {
            trimmed = trimmed.trim_end();
        }
        trimmed
    }

    /// 블록 밖의 마크업
    fn minify_markup(&self, segment: &str) -> Result<String, MinifyError> {
        if let Some(caps) = self.block_open.captures(segment) {
            let tag = caps.get(1).map(|m| m.as_str().to_ascii_lowercase()).unwrap_or_default();
            return Err(MinifyError::UnclosedBlock(tag));
        }

        // 조건부 주석(<!--[if IE]>)은 남긴다
        let without_comments = self.comment.replace_all(segment, |caps: &Captures| {
            let comment = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            if comment.starts_with("<!--[") {
                comment.to_string()
            } else {
                String::new()
            }
        });
        if self.comment.replace_all(&without_comments, "").contains("<!--") {
            return Err(MinifyError::UnclosedComment);
        }

        Ok(self.collapse(&without_comments))
    }

    /// 태그 밖 텍스트와 태그 안 공백을 줄입니다. 따옴표로 감싼 속성 값은 그대로 둡니다.
    fn collapse(&self, markup: &str) -> String {
        let bytes = markup.as_bytes();
        let mut out = String::with_capacity(markup.len());
        let mut text_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let is_tag = bytes[i] == b'<'
                && bytes
                    .get(i + 1)
                    .is_some_and(|&b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'));
            if !is_tag {
                i += 1;
                continue;
            }

            let end = tag_end(bytes, i);
            self.push_text(&mut out, &markup[text_start..i], true);
            push_tag(&mut out, &markup[i..end]);
            i = end;
            text_start = end;
        }
        self.push_text(&mut out, &markup[text_start..], false);

        out
    }

    fn push_text(&self, out: &mut String, text: &str, before_tag: bool) {
        if text.is_empty() {
            return;
        }
        let between_tags = before_tag && out.ends_with('>') && text.trim().is_empty();
        if self.options.remove_intertag_spaces && between_tags {
            return;
        }
        out.push_str(&self.whitespace.replace_all(text, " "));
    }

    fn minify_block(&self, block: &str) -> String {
        let lower = block.get(..7).unwrap_or(block).to_ascii_lowercase();
        let compress = if lower.starts_with("<style") {
            self.options.compress_css
        } else if lower.starts_with("<script") {
            self.options.compress_js
        } else {
            false
        };
        if !compress {
            return block.to_string();
        }

        let (Some(open_end), Some(close_start)) = (block.find('>'), block.rfind("</")) else {
            return block.to_string();
        };
        if close_start <= open_end {
            return block.to_string();
        }

        let (open, rest) = block.split_at(open_end + 1);
        let (inner, close) = rest.split_at(close_start - open_end - 1);

        let minified = if lower.starts_with("<style") {
            // 인라인 스타일 압축에 실패하면 원문을 둔다
            self.css.minify(inner).unwrap_or_else(|_| inner.to_string())
        } else {
            self.js.minify(inner)
        };

        format!("{}{}{}", open, minified, close)
    }
}

// 따옴표 안의 `>` 는 태그 끝이 아니다
fn tag_end(bytes: &[u8], start: usize) -> usize {
    let mut quote: Option<u8> = None;
    let mut j = start + 1;
    while j < bytes.len() {
        match (quote, bytes[j]) {
            (None, b'"' | b'\'') => quote = Some(bytes[j]),
            (Some(q), b) if b == q => quote = None,
            (None, b'>') => return j + 1,
            _ => {}
        }
        j += 1;
    }
    bytes.len()
}

fn push_tag(out: &mut String, tag: &str) {
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    for c in tag.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => pending_space = true,
            None => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
}
