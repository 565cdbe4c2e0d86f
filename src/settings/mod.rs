use std::{collections::HashMap, env, fs, path::Path};
use serde::Deserialize;
use tracing::debug;
use crate::filter::FilterConfig;

mod server;
pub mod logging;
mod error;

pub use server::ServerSettings;
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use server::parse_env_var;

pub const CONFIG_FILE_ENV: &str = "FILTER_CONFIG_FILE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    /// 필터 설정
    #[serde(default)]
    pub filters: HashMap<String, FilterConfig>,
}

impl Settings {
    /// `FILTER_CONFIG_FILE` 이 있으면 TOML 파일에서, 없으면 환경 변수에서 읽습니다.
    pub fn load() -> Result<Self> {
        match env::var(CONFIG_FILE_ENV) {
            Ok(config_path) => Self::from_toml_file(&config_path),
            Err(_) => Self::from_env(),
        }
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            source: e,
        })?;

        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.as_ref().display(), filters = settings.filters.len(), "설정 파일 로드 완료");
        Ok(settings)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)?;

        settings.server.validate()?;
        Ok(settings)
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            filters: HashMap::new(),
        })
    }

    /// 실제로 적용할 필터 설정. 아무것도 설정하지 않았으면 기본 체인을 씁니다.
    pub fn effective_filters(&self) -> HashMap<String, FilterConfig> {
        if self.filters.is_empty() {
            FilterConfig::defaults()
        } else {
            self.filters.clone()
        }
    }
}
