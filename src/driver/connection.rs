//! Connection string generation
//!
//! Builds the libpq-style key/value string used to reach QuestDB over the
//! Postgres wire protocol. Opening the connection itself is left to the
//! caller.

use thiserror::Error;

use super::settings::{Settings, TlsConfigurationMethod, TlsMode};

/// QuestDB always exposes a single database over the wire protocol
const DATABASE_NAME: &str = "qdb";

/// Errors that can occur while building a connection string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// Only one half of a client certificate pair was supplied
    #[error("TLS/SSL client certificate and key must both be specified")]
    IncompleteClientCertificate,
}

/// Result type for connection string operations
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Application name reported to the server, e.g. `grafana:11.0.0;questframe:0.1.0`
pub fn client_version(host_version: Option<&str>) -> String {
    let mut parts = Vec::with_capacity(2);
    if let Some(version) = host_version.filter(|v| !v.is_empty()) {
        parts.push(format!("grafana:{}", version));
    }
    parts.push(format!("questframe:{}", env!("CARGO_PKG_VERSION")));
    parts.join(";")
}

/// Build the connection string for `settings`
pub fn connection_string(settings: &Settings, application_name: &str) -> ConnectionResult<String> {
    let mut conn = format!(
        "user='{}' password='{}' host='{}' dbname='{}'",
        escape(&settings.username),
        escape(&settings.password),
        escape(&settings.server),
        DATABASE_NAME
    );

    if settings.port > 0 {
        conn.push_str(&format!(" port={}", settings.port));
    }

    if !application_name.is_empty() {
        conn.push_str(&format!(" application_name='{}'", escape(application_name)));
    }

    if settings.timeout_secs > 0 {
        conn.push_str(&format!(" connect_timeout={}", settings.timeout_secs));
    }

    conn.push_str(&format!(" sslmode='{}'", settings.tls_mode));

    if settings.tls_mode != TlsMode::Disable {
        match settings.tls_configuration_method {
            Some(TlsConfigurationMethod::FileContent) => {
                conn.push_str(" sslinline=true");
                append_certificates(
                    &mut conn,
                    settings.tls_ca_cert.as_deref(),
                    settings.tls_client_cert.as_deref(),
                    settings.tls_client_key.as_deref(),
                )?;
            }
            Some(TlsConfigurationMethod::FilePath) => {
                append_certificates(
                    &mut conn,
                    settings.tls_ca_cert_file.as_deref(),
                    settings.tls_client_cert_file.as_deref(),
                    settings.tls_client_key_file.as_deref(),
                )?;
            }
            None => {}
        }
    }

    tracing::debug!(
        host = %settings.server,
        port = settings.port,
        sslmode = %settings.tls_mode,
        "Generated QuestDB connection string"
    );
    Ok(conn)
}

fn append_certificates(
    conn: &mut String,
    root_cert: Option<&str>,
    client_cert: Option<&str>,
    client_key: Option<&str>,
) -> ConnectionResult<()> {
    if let Some(root) = root_cert.filter(|c| !c.is_empty()) {
        conn.push_str(&format!(" sslrootcert='{}'", escape(root)));
    }

    let client_cert = client_cert.filter(|c| !c.is_empty());
    let client_key = client_key.filter(|k| !k.is_empty());
    match (client_cert, client_key) {
        (Some(cert), Some(key)) => {
            conn.push_str(&format!(
                " sslcert='{}' sslkey='{}'",
                escape(cert),
                escape(key)
            ));
            Ok(())
        }
        (None, None) => Ok(()),
        _ => Err(ConnectionError::IncompleteClientCertificate),
    }
}

/// Escape backslashes and single quotes in a connection string value
fn escape(input: &str) -> String {
    input.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            server: "localhost".to_string(),
            port: 8812,
            username: "admin".to_string(),
            password: "quest".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_plain_connection_string() {
        let conn = connection_string(&settings(), "app").unwrap();
        assert_eq!(
            conn,
            "user='admin' password='quest' host='localhost' dbname='qdb' port=8812 application_name='app' connect_timeout=10 sslmode='disable'"
        );
    }

    #[test]
    fn test_escaping() {
        let mut s = settings();
        s.password = r"it's\secret".to_string();
        let conn = connection_string(&s, "").unwrap();
        assert!(conn.contains(r"password='it\'s\\secret'"));
        assert!(!conn.contains("application_name"));
    }

    #[test]
    fn test_zero_timeout_omitted() {
        let mut s = settings();
        s.timeout_secs = 0;
        let conn = connection_string(&s, "").unwrap();
        assert!(!conn.contains("connect_timeout"));
    }

    #[test]
    fn test_tls_file_content() {
        let mut s = settings();
        s.tls_mode = TlsMode::VerifyFull;
        s.tls_configuration_method = Some(TlsConfigurationMethod::FileContent);
        s.tls_ca_cert = Some("CA".to_string());
        s.tls_client_cert = Some("CERT".to_string());
        s.tls_client_key = Some("KEY".to_string());

        let conn = connection_string(&s, "").unwrap();
        assert!(conn.ends_with(
            " sslmode='verify-full' sslinline=true sslrootcert='CA' sslcert='CERT' sslkey='KEY'"
        ));
    }

    #[test]
    fn test_tls_file_path() {
        let mut s = settings();
        s.tls_mode = TlsMode::VerifyCa;
        s.tls_configuration_method = Some(TlsConfigurationMethod::FilePath);
        s.tls_ca_cert_file = Some("/etc/qdb/ca.pem".to_string());

        let conn = connection_string(&s, "").unwrap();
        assert!(conn.ends_with(" sslmode='verify-ca' sslrootcert='/etc/qdb/ca.pem'"));
        assert!(!conn.contains("sslinline"));
    }

    #[test]
    fn test_tls_requires_cert_and_key() {
        let mut s = settings();
        s.tls_mode = TlsMode::Require;
        s.tls_configuration_method = Some(TlsConfigurationMethod::FileContent);
        s.tls_client_cert = Some("CERT".to_string());

        assert_eq!(
            connection_string(&s, "").unwrap_err(),
            ConnectionError::IncompleteClientCertificate
        );
    }

    #[test]
    fn test_tls_ignored_when_disabled() {
        let mut s = settings();
        s.tls_configuration_method = Some(TlsConfigurationMethod::FileContent);
        s.tls_client_cert = Some("CERT".to_string());
        let conn = connection_string(&s, "").unwrap();
        assert!(conn.ends_with("sslmode='disable'"));
    }

    #[test]
    fn test_client_version() {
        let version = env!("CARGO_PKG_VERSION");
        assert_eq!(
            client_version(Some("11.0.0")),
            format!("grafana:11.0.0;questframe:{}", version)
        );
        assert_eq!(client_version(None), format!("questframe:{}", version));
        assert_eq!(client_version(Some("")), format!("questframe:{}", version));
    }
}
