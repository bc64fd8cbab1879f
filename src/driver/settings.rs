//! Datasource settings
//!
//! Loads the per-datasource settings a host stores for a QuestDB
//! connection. Numeric fields may arrive as JSON numbers or strings; secrets
//! (password, TLS material) come from a separate decrypted map.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading datasource settings
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("could not parse json: {0}")]
    InvalidJson(String),

    #[error("invalid server name. Either empty or not set")]
    InvalidServerName,

    #[error("invalid port")]
    InvalidPort,

    #[error("username is either empty or not set")]
    InvalidUserName,

    #[error("password is either empty or not set")]
    InvalidPassword,

    #[error("could not parse {field} value: {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("invalid tls mode: {0}")]
    InvalidTlsMode(String),

    #[error("invalid ssl configuration method: {0}")]
    InvalidTlsConfigurationMethod(String),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// TLS mode passed to the Postgres wire connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TlsMode {
    #[default]
    Disable,
    Require,
    VerifyCa,
    VerifyFull,
}

impl FromStr for TlsMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disable" => Ok(Self::Disable),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCa),
            "verify-full" => Ok(Self::VerifyFull),
            other => Err(SettingsError::InvalidTlsMode(other.to_string())),
        }
    }
}

impl fmt::Display for TlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disable => write!(f, "disable"),
            Self::Require => write!(f, "require"),
            Self::VerifyCa => write!(f, "verify-ca"),
            Self::VerifyFull => write!(f, "verify-full"),
        }
    }
}

/// Where TLS certificates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TlsConfigurationMethod {
    /// PEM content stored in the secure settings
    FileContent,
    /// Paths to PEM files readable by the connection layer
    FilePath,
}

impl FromStr for TlsConfigurationMethod {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file-content" => Ok(Self::FileContent),
            "file-path" => Ok(Self::FilePath),
            other => Err(SettingsError::InvalidTlsConfigurationMethod(
                other.to_string(),
            )),
        }
    }
}

/// Connection settings for one QuestDB datasource
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: String,
    pub port: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,

    pub tls_mode: TlsMode,
    pub tls_configuration_method: Option<TlsConfigurationMethod>,
    #[serde(skip_serializing)]
    pub tls_ca_cert: Option<String>,
    #[serde(skip_serializing)]
    pub tls_client_cert: Option<String>,
    #[serde(skip_serializing)]
    pub tls_client_key: Option<String>,
    pub tls_ca_cert_file: Option<String>,
    pub tls_client_cert_file: Option<String>,
    pub tls_client_key_file: Option<String>,

    /// Connect timeout in seconds
    pub timeout_secs: u64,
    /// Query timeout in seconds
    pub query_timeout_secs: u64,
    pub max_open_connections: i64,
    pub max_idle_connections: i64,
    /// Maximum connection lifetime in seconds
    pub max_connection_lifetime_secs: i64,
}

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 60;

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: 0,
            username: String::new(),
            password: String::new(),
            tls_mode: TlsMode::default(),
            tls_configuration_method: None,
            tls_ca_cert: None,
            tls_client_cert: None,
            tls_client_key: None,
            tls_ca_cert_file: None,
            tls_client_cert_file: None,
            tls_client_key_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            max_open_connections: 0,
            max_idle_connections: 0,
            max_connection_lifetime_secs: 0,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tls_mode", &self.tls_mode)
            .field("tls_configuration_method", &self.tls_configuration_method)
            .field("timeout_secs", &self.timeout_secs)
            .field("query_timeout_secs", &self.query_timeout_secs)
            .field("max_open_connections", &self.max_open_connections)
            .field("max_idle_connections", &self.max_idle_connections)
            .field(
                "max_connection_lifetime_secs",
                &self.max_connection_lifetime_secs,
            )
            .finish_non_exhaustive()
    }
}

/// 2^63, the smallest f64 magnitude outside the i64 range
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Number field that hosts may store either as a number or as a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Parse the value; blank strings count as unset
    fn to_i64(&self, field: &'static str) -> SettingsResult<Option<i64>> {
        match self {
            Numeric::Number(n) if n.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(n) => {
                Ok(Some(*n as i64))
            }
            Numeric::Number(n) => Err(SettingsError::InvalidNumber {
                field,
                value: n.to_string(),
            }),
            Numeric::Text(s) if s.trim().is_empty() => Ok(None),
            Numeric::Text(s) => s.trim().parse::<i64>().map(Some).map_err(|_| {
                SettingsError::InvalidNumber {
                    field,
                    value: s.clone(),
                }
            }),
        }
    }

    fn to_u64(&self, field: &'static str) -> SettingsResult<Option<u64>> {
        match self.to_i64(field)? {
            Some(v) => u64::try_from(v)
                .map(Some)
                .map_err(|_| SettingsError::InvalidNumber {
                    field,
                    value: v.to_string(),
                }),
            None => Ok(None),
        }
    }
}

/// Non-secret settings as stored by the host
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct InstanceJson {
    server: Option<String>,
    port: Option<Numeric>,
    username: Option<String>,
    timeout: Option<Numeric>,
    query_timeout: Option<Numeric>,
    max_open_connections: Option<Numeric>,
    max_idle_connections: Option<Numeric>,
    max_connection_lifetime: Option<Numeric>,
    tls_mode: Option<String>,
    tls_configuration_method: Option<String>,
    #[serde(alias = "tlsCACertFile")]
    tls_ca_cert_file: Option<String>,
    tls_client_cert_file: Option<String>,
    tls_client_key_file: Option<String>,
}

impl Settings {
    /// Load and validate settings from the host's JSON and decrypted secrets
    pub fn from_instance(json_data: &str, secure: &HashMap<String, String>) -> SettingsResult<Self> {
        let json: InstanceJson = serde_json::from_str(json_data)
            .map_err(|e| SettingsError::InvalidJson(e.to_string()))?;

        let mut settings = Settings {
            server: json.server.unwrap_or_default(),
            username: json.username.unwrap_or_default(),
            tls_ca_cert_file: json.tls_ca_cert_file,
            tls_client_cert_file: json.tls_client_cert_file,
            tls_client_key_file: json.tls_client_key_file,
            ..Settings::default()
        };

        if let Some(port) = &json.port {
            settings.port = port.to_i64("port")?.unwrap_or(0);
        }
        if let Some(timeout) = json.timeout.as_ref().map(|v| v.to_u64("timeout")).transpose()? {
            settings.timeout_secs = timeout.unwrap_or(DEFAULT_TIMEOUT_SECS);
        }
        if let Some(timeout) = json
            .query_timeout
            .as_ref()
            .map(|v| v.to_u64("queryTimeout"))
            .transpose()?
        {
            settings.query_timeout_secs = timeout.unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS);
        }
        if let Some(v) = &json.max_open_connections {
            settings.max_open_connections = v.to_i64("maxOpenConnections")?.unwrap_or(0);
        }
        if let Some(v) = &json.max_idle_connections {
            settings.max_idle_connections = v.to_i64("maxIdleConnections")?.unwrap_or(0);
        }
        if let Some(v) = &json.max_connection_lifetime {
            settings.max_connection_lifetime_secs =
                v.to_i64("maxConnectionLifetime")?.unwrap_or(0);
        }

        if let Some(mode) = json.tls_mode.as_deref().filter(|m| !m.is_empty()) {
            settings.tls_mode = mode.parse()?;
        }
        if let Some(method) = json
            .tls_configuration_method
            .as_deref()
            .filter(|m| !m.is_empty())
        {
            settings.tls_configuration_method = Some(method.parse()?);
        }

        if let Some(password) = secure.get("password") {
            settings.password = password.clone();
        }
        settings.tls_ca_cert = secure.get("tlsCACert").cloned();
        settings.tls_client_cert = secure.get("tlsClientCert").cloned();
        settings.tls_client_key = secure.get("tlsClientKey").cloned();

        settings.validate()?;
        tracing::debug!(server = %settings.server, port = settings.port, "Loaded datasource settings");
        Ok(settings)
    }

    /// Check the fields required to open a connection
    pub fn validate(&self) -> SettingsResult<()> {
        if self.server.is_empty() {
            return Err(SettingsError::InvalidServerName);
        }
        if self.port <= 0 {
            return Err(SettingsError::InvalidPort);
        }
        if self.username.is_empty() {
            return Err(SettingsError::InvalidUserName);
        }
        if self.password.is_empty() {
            return Err(SettingsError::InvalidPassword);
        }
        Ok(())
    }
}
