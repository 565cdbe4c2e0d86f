//! HTML, CSS, JavaScript 공백 압축
//!
//! 문자열, 템플릿, 속성 값 같은 리터럴은 건드리지 않고 그 밖의 공백과 주석만 제거합니다.
//! `<pre>`, `<textarea>` 내용은 손대지 않고, 인라인 `<style>`/`<script>` 는 옵션에 따라 압축합니다.

mod css;
mod html;
mod js;

pub use css::CssMinifier;
pub use html::HtmlMinifier;
pub use js::JsMinifier;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum MinifyError {
    #[error("닫히지 않은 <{0}> 블록")]
    UnclosedBlock(String),

    #[error("닫히지 않은 주석")]
    UnclosedComment,

    #[error("패턴 컴파일 실패: {0}")]
    Pattern(#[from] regex_lite::Error),
}

/// 응답 텍스트 변환기
pub trait Minifier: Send + Sync {
    /// `content_type` 에 맞게 `content` 를 압축합니다.
    fn minify(&self, content: &str, content_type: &str) -> Result<String, MinifyError>;
}

/// 압축 옵션
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MinifyOptions {
    /// 인라인 `<style>` 압축 여부
    #[serde(default = "default_true")]
    pub compress_css: bool,

    /// 인라인 `<script>` 압축 여부
    #[serde(default = "default_true")]
    pub compress_js: bool,

    /// 태그 사이 공백 제거 여부
    #[serde(default)]
    pub remove_intertag_spaces: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            compress_css: true,
            compress_js: true,
            remove_intertag_spaces: false,
        }
    }
}

/// Content-Type 에 따라 HTML/CSS/JavaScript 압축기를 고릅니다.
pub struct ContentMinifier {
    html: HtmlMinifier,
    css: CssMinifier,
    js: JsMinifier,
}

impl ContentMinifier {
    pub fn new(options: MinifyOptions) -> Result<Self, MinifyError> {
        let css = CssMinifier::new()?;
        let js = JsMinifier::new();
        Ok(Self {
            html: HtmlMinifier::new(options, css.clone(), js.clone())?,
            css,
            js,
        })
    }
}

impl Minifier for ContentMinifier {
    fn minify(&self, content: &str, content_type: &str) -> Result<String, MinifyError> {
        let content_type = content_type.to_ascii_lowercase();

        if content_type.contains("html") || content_type.contains("xml") || content_type.is_empty() {
            self.html.minify(content)
        } else if content_type.contains("css") {
            self.css.minify(content)
        } else if content_type.contains("javascript") {
            Ok(self.js.minify(content))
        } else {
            self.html.minify(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minifier() -> ContentMinifier {
        ContentMinifier::new(MinifyOptions::default()).unwrap()
    }

    #[test]
    fn test_routes_by_content_type() {
        let m = minifier();
        assert_eq!(
            m.minify("a {\n  color: red;\n}\n", "text/css").unwrap(),
            "a{color:red}"
        );
        assert_eq!(
            m.minify("  var a = 1;\n\n  // note\n  call(a);\n", "text/javascript").unwrap(),
            "var a = 1;\ncall(a);"
        );
        assert_eq!(
            m.minify("<html><body>  Hello  </body></html>", "text/html; charset=utf-8").unwrap(),
            "<html><body> Hello </body></html>"
        );
    }

    #[test]
    fn test_deterministic() {
        let m = minifier();
        let input = "<div>\n  <p>one</p>\n  <p>two</p>\n</div>";
        assert_eq!(m.minify(input, "text/html").unwrap(), m.minify(input, "text/html").unwrap());
    }

    #[test]
    fn test_options_from_json_defaults() {
        let options: MinifyOptions = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(options, MinifyOptions::default());

        let options: MinifyOptions =
            serde_json::from_value(serde_json::json!({ "compress_js": false })).unwrap();
        assert!(!options.compress_js);
        assert!(options.compress_css);
    }
}
