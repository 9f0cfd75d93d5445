//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_STORAGE_PATH, DEFAULT_TIMEOUT_SECONDS};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
}

/// Backend connection settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl AppConfig {
    /// Defaults, then `config/default`, then `config/{APP_ENV}`, then
    /// `STUDIO__*` environment variables.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("STUDIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: AppConfig = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.name", "studio")?
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_seconds", DEFAULT_TIMEOUT_SECONDS as i64)?
            .set_default("storage.path", DEFAULT_STORAGE_PATH)?
            .set_default("log.level", "warn")?
            .set_default("log.json", false)
    }

    fn validate(&self) -> Result<(), AppError> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(AppError::InvalidSetting {
                key: "api.base_url".into(),
                reason: format!("expected an http(s) origin, got {:?}", self.api.base_url),
            });
        }
        if self.api.timeout_seconds == 0 {
            return Err(AppError::InvalidSetting {
                key: "api.timeout_seconds".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_defaults() -> AppConfig {
        AppConfig::defaults()
            .and_then(|b| b.build())
            .and_then(|c| c.try_deserialize())
            .expect("defaults deserialize")
    }

    #[test]
    fn test_defaults() {
        let config = from_defaults();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert_eq!(config.storage.path, DEFAULT_STORAGE_PATH);
        assert!(!config.log.json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let mut config = from_defaults();
        config.api.base_url = "ftp://example.com".into();
        assert!(matches!(
            config.validate(),
            Err(AppError::InvalidSetting { ref key, .. }) if key == "api.base_url"
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = from_defaults();
        config.api.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
