use serde::{Deserialize, Deserializer};
use std::env;
use tracing::Level;
use super::{server::parse_env_var, SettingsError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogOutput {
    #[default]
    Stdout,
    File(String),
}

impl std::str::FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdout" => Ok(LogOutput::Stdout),
            _ => Ok(LogOutput::File(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for LogOutput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub format: LogFormat,
    pub level: Level,
    pub output: LogOutput,
    /// 요청/응답 교환 상세 로깅. 프로세스 시작 시 한 번 읽습니다.
    pub verbose: bool,
}

impl LogSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            format: parse_env_var("FILTER_LOG_FORMAT", LogFormat::default)?,
            level: parse_log_level(env::var("FILTER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))?,
            output: parse_env_var("FILTER_LOG_OUTPUT", LogOutput::default)?,
            verbose: parse_env_var("FILTER_VERBOSE_LOGGING", || false)?,
        })
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: Level::INFO,
            output: LogOutput::default(),
            verbose: false,
        }
    }
}

fn parse_log_level(level: String) -> Result<Level, SettingsError> {
    level.parse::<Level>().map_err(|_| SettingsError::EnvVarInvalid {
        var_name: "FILTER_LOG_LEVEL".to_string(),
        value: level,
        reason: "유효하지 않은 로그 레벨".to_string(),
    })
}

impl<'de> Deserialize<'de> for LogSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default)]
            format: LogFormat,
            #[serde(default = "default_log_level_string")]
            level: String,
            #[serde(default)]
            output: LogOutput,
            #[serde(default)]
            verbose: bool,
        }

        let helper = Helper::deserialize(deserializer)?;
        let level = helper.level.parse::<Level>()
            .map_err(|_| serde::de::Error::custom(format!("유효하지 않은 로그 레벨: {}", helper.level)))?;

        Ok(LogSettings {
            format: helper.format,
            level,
            output: helper.output,
            verbose: helper.verbose,
        })
    }
}

fn default_log_level_string() -> String {
    "info".to_string()
}
