use serde::Deserialize;
use std::env;
use super::SettingsError;

#[derive(Clone, Debug, Deserialize)]
pub struct ServerSettings {
    /// 바인딩 주소 (기본값: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP 포트 (기본값: 8080)
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

fn default_bind_address() -> String { "0.0.0.0".to_string() }
fn default_http_port() -> u16 { 8080 }

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.trim().parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val.clone(),
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            bind_address: parse_env_var("FILTER_BIND_ADDRESS", default_bind_address)?,
            http_port: parse_env_var("FILTER_HTTP_PORT", default_http_port)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bind_address.trim().is_empty() {
            return Err(SettingsError::Validation {
                field: "server.bind_address",
                reason: "바인딩 주소가 비어 있습니다".to_string(),
            });
        }

        Ok(())
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
        }
    }
}
