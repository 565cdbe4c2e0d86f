use thiserror::Error;

/// 설정 로드 에러
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("환경 변수 {var_name} 값 '{value}' 오류: {reason}")]
    EnvVarInvalid {
        var_name: String,
        value: String,
        reason: String,
    },

    #[error("설정 파일 {path} 오류: {source}")]
    FileError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("설정 파싱 오류: {source}")]
    ParseError {
        #[from]
        source: toml::de::Error,
    },

    #[error("잘못된 설정 {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: String,
    },
}
