use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 필터 종류
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    /// 요청 시작/종료 로깅
    Logging,
    /// 본문까지 포함한 요청 로깅
    RequestLogging,
    /// HTML, JavaScript, CSS 압축
    Minify,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// 필터 타입
    pub filter_type: FilterType,

    /// 필터 활성화 여부
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 실행 순서 (낮은 숫자가 바깥쪽에서 먼저 실행)
    #[serde(default)]
    pub order: i32,

    /// 필터별 설정
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

impl FilterConfig {
    pub fn new(filter_type: FilterType, order: i32) -> Self {
        Self {
            filter_type,
            enabled: true,
            order,
            settings: HashMap::new(),
        }
    }

    /// 설정이 없을 때 쓰는 기본 체인: 본문 로깅 → 압축
    pub fn defaults() -> HashMap<String, Self> {
        HashMap::from([
            ("request-logging".to_string(), Self::new(FilterType::RequestLogging, 0)),
            ("minify".to_string(), Self::new(FilterType::Minify, 1)),
        ])
    }

    /// TOML 설정에서 필터 설정을 파싱합니다.
    pub fn from_toml(config: &str) -> Result<HashMap<String, Self>, toml::de::Error> {
        #[derive(Deserialize)]
        struct Config {
            #[serde(default)]
            filters: HashMap<String, FilterConfig>,
        }

        let config: Config = toml::from_str(config)?;
        Ok(config.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_config() {
        let toml_str = r#"
            [filters.access]
            filter_type = "logging"
            order = 2

            [filters.compress]
            filter_type = "minify"
            enabled = false

            [filters.compress.settings]
            compress_js = false
        "#;

        let configs = FilterConfig::from_toml(toml_str).unwrap();
        assert_eq!(configs.len(), 2);

        let access = configs.get("access").unwrap();
        assert_eq!(access.filter_type, FilterType::Logging);
        assert!(access.enabled);
        assert_eq!(access.order, 2);

        let compress = configs.get("compress").unwrap();
        assert_eq!(compress.filter_type, FilterType::Minify);
        assert!(!compress.enabled);
        assert_eq!(compress.settings.get("compress_js"), Some(&serde_json::Value::Bool(false)));
    }

    #[test]
    fn test_unknown_filter_type_is_rejected() {
        let toml_str = r#"
            [filters.auth]
            filter_type = "basic-auth"
        "#;
        assert!(FilterConfig::from_toml(toml_str).is_err());
    }

    #[test]
    fn test_defaults() {
        let defaults = FilterConfig::defaults();
        assert_eq!(defaults["request-logging"].filter_type, FilterType::RequestLogging);
        assert_eq!(defaults["minify"].order, 1);
    }
}
