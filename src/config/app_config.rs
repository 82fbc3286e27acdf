use serde::Deserialize;

use crate::domain::key::DEFAULT_TTL_SECS;
use crate::infrastructure::key::{
    DEFAULT_DISPLAY_PREFIX, DEFAULT_SWEEP_INTERVAL_SECS, DEFAULT_TOKEN_LENGTH,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub keys: KeysConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Key issuance settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Record lifetime in seconds
    pub ttl_secs: u64,
    /// Reaper sweep interval in seconds
    pub sweep_interval_secs: u64,
    /// Length of generated tokens
    pub token_length: usize,
    /// Literal prepended to externally visible keys
    pub display_prefix: String,
}

/// Storage backend selection
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend name: "memory" or "postgres"
    pub backend: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            token_length: DEFAULT_TOKEN_LENGTH,
            display_prefix: DEFAULT_DISPLAY_PREFIX.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.keys.ttl_secs, 86_400);
        assert_eq!(config.keys.sweep_interval_secs, 3_600);
        assert_eq!(config.keys.token_length, 10);
        assert_eq!(config.keys.display_prefix, "Sang_");
        assert_eq!(config.storage.backend, "memory");
    }

    #[test]
    fn test_deserialize_partial_overrides() {
        let json = r#"{
            "server": {"port": 9090},
            "keys": {"ttl_secs": 120},
            "storage": {"backend": "postgres"}
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.keys.ttl_secs, 120);
        assert_eq!(config.keys.token_length, 10);
        assert_eq!(config.storage.backend, "postgres");
    }

    #[test]
    fn test_log_format_deserialization() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"level": "debug", "format": "json"}"#).unwrap();

        assert_eq!(config.level, "debug");
        assert!(matches!(config.format, LogFormat::Json));
    }
}
