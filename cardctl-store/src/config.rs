//! Connection parameters for the card database
//!
//! The store treats this as an opaque parameter set; where the values come
//! from (file, environment) is the caller's concern.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;

const DEFAULT_PORT: u16 = 5432;

/// Kept low for single-user tooling.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 10;

/// Everything needed to open a session with the card database
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub max_connections: u32,
    /// Bound on establishing a session or acquiring one from the pool
    pub connect_timeout_secs: u64,
    /// Bound on every statement, enforced by the client and the server
    pub statement_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            database: "cards".to_string(),
            user: "postgres".to_string(),
            password: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            statement_timeout_secs: DEFAULT_STATEMENT_TIMEOUT_SECS,
        }
    }
}

// Credential stays out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("statement_timeout_secs", &self.statement_timeout_secs)
            .finish()
    }
}

impl StoreConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.max(1))
    }

    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.statement_timeout_secs.max(1))
    }

    /// Build sqlx connect options, including the server-side statement timeout.
    pub fn connect_options(&self) -> PgConnectOptions {
        let statement_timeout_ms = self.statement_timeout().as_millis().to_string();

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .application_name("cardctl")
            .options([("statement_timeout", statement_timeout_ms)]);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    /// Human-readable target without the credential, for log lines.
    pub fn display_target(&self) -> String {
        format!("{}@{}:{}/{}", self.user, self.host, self.port, self.database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "cards");
        assert_eq!(config.statement_timeout(), Duration::from_secs(10));
        assert_eq!(config.display_target(), "postgres@localhost:5432/cards");
    }

    #[test]
    fn debug_redacts_password() {
        let config = StoreConfig {
            password: Some("hunter2".to_string()),
            ..StoreConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: StoreConfig = toml::from_str(
            r#"
            host = "db.internal"
            user = "collector"
            password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.user, "collector");
        assert_eq!(config.port, 5432);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn zero_timeouts_are_raised_to_one_second() {
        let config = StoreConfig {
            connect_timeout_secs: 0,
            statement_timeout_secs: 0,
            ..StoreConfig::default()
        };
        assert_eq!(config.connect_timeout(), Duration::from_secs(1));
        assert_eq!(config.statement_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn connect_options_carry_target() {
        let config = StoreConfig {
            host: "db.internal".to_string(),
            port: 6543,
            database: "collection".to_string(),
            user: "collector".to_string(),
            ..StoreConfig::default()
        };
        let options = config.connect_options();

        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("collection"));
        assert_eq!(options.get_username(), "collector");
    }
}
