//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::convert::UnknownColumnPolicy;
use crate::driver::{DriverSettings, Settings, TlsMode};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub datasource: Settings,

    #[serde(default)]
    pub decode: DecodeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Result decoding configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecodeConfig {
    #[serde(default)]
    pub unknown_columns: UnknownColumnPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("questframe").join("config.toml")),
            Some(PathBuf::from("/etc/questframe/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Query settings for a [`Driver`](crate::driver::Driver)
    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings::from_settings(&self.datasource).unknown_columns(self.decode.unknown_columns)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `QUESTFRAME_*` overrides read through `var`
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Datasource overrides
        if let Some(server) = var("QUESTFRAME_SERVER") {
            self.datasource.server = server;
        }
        if let Some(port) = var("QUESTFRAME_PORT") {
            match port.parse() {
                Ok(p) => self.datasource.port = p,
                Err(_) => tracing::warn!("Ignoring invalid QUESTFRAME_PORT: {}", port),
            }
        }
        if let Some(username) = var("QUESTFRAME_USERNAME") {
            self.datasource.username = username;
        }
        if let Some(password) = var("QUESTFRAME_PASSWORD") {
            self.datasource.password = password;
        }
        if let Some(mode) = var("QUESTFRAME_TLS_MODE") {
            match mode.parse::<TlsMode>() {
                Ok(m) => self.datasource.tls_mode = m,
                Err(e) => tracing::warn!("Ignoring QUESTFRAME_TLS_MODE: {}", e),
            }
        }

        // Logging overrides
        if let Some(level) = var("QUESTFRAME_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("QUESTFRAME_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# questframe Configuration
#
# Environment variables override these settings:
# - QUESTFRAME_SERVER
# - QUESTFRAME_PORT
# - QUESTFRAME_USERNAME
# - QUESTFRAME_PASSWORD
# - QUESTFRAME_TLS_MODE
# - QUESTFRAME_LOG_LEVEL
# - QUESTFRAME_LOG_FORMAT

[datasource]
# QuestDB host serving the Postgres wire protocol
server = "localhost"
port = 8812

username = "admin"
# Prefer QUESTFRAME_PASSWORD over storing the password here
password = "quest"

# TLS mode: disable, require, verify-ca, verify-full
tls_mode = "disable"

# Where TLS material comes from: file-content or file-path
# tls_configuration_method = "file-path"
# tls_ca_cert_file = "/etc/questframe/ca.pem"
# tls_client_cert_file = "/etc/questframe/client.pem"
# tls_client_key_file = "/etc/questframe/client.key"

# Connect timeout (seconds)
timeout_secs = 10

# Query timeout (seconds)
query_timeout_secs = 60

[decode]
# Columns with unsupported wire types: fail or skip
unknown_columns = "fail"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/questframe/questframe.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::TlsConfigurationMethod;
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.datasource.server, "localhost");
        assert_eq!(config.datasource.port, 8812);
        assert_eq!(config.datasource.password, "quest");
        assert_eq!(config.datasource.tls_mode, TlsMode::Disable);
        assert_eq!(config.decode.unknown_columns, UnknownColumnPolicy::Fail);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
        assert!(config.datasource.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.datasource.timeout_secs, 10);
        assert_eq!(config.datasource.query_timeout_secs, 60);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[datasource]
server = "qdb.internal"
port = 9000
username = "reader"
tls_mode = "verify-full"
tls_configuration_method = "file-path"
tls_ca_cert_file = "/tmp/ca.pem"
query_timeout_secs = 5

[decode]
unknown_columns = "skip"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.datasource.server, "qdb.internal");
        assert_eq!(config.datasource.tls_mode, TlsMode::VerifyFull);
        assert_eq!(
            config.datasource.tls_configuration_method,
            Some(TlsConfigurationMethod::FilePath)
        );

        let driver_settings = config.driver_settings();
        assert_eq!(driver_settings.query_timeout, Duration::from_secs(5));
        assert_eq!(driver_settings.unknown_columns, UnknownColumnPolicy::Skip);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::Io { .. })
        ));

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[datasource\nserver = 1").unwrap();
        assert!(matches!(Config::load(&bad), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("QUESTFRAME_SERVER", "db.example"),
            ("QUESTFRAME_PORT", "8813"),
            ("QUESTFRAME_PASSWORD", "s3cret"),
            ("QUESTFRAME_TLS_MODE", "require"),
            ("QUESTFRAME_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.datasource.server, "db.example");
        assert_eq!(config.datasource.port, 8813);
        assert_eq!(config.datasource.password, "s3cret");
        assert_eq!(config.datasource.tls_mode, TlsMode::Require);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "QUESTFRAME_PORT" => Some("not-a-port".to_string()),
            "QUESTFRAME_TLS_MODE" => Some("sometimes".to_string()),
            _ => None,
        });
        assert_eq!(config.datasource.port, 0);
        assert_eq!(config.datasource.tls_mode, TlsMode::Disable);
    }
}
