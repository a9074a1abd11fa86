//! Store configuration
//!
//! Connection configuration for the `PostgreSQL` backend.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use crate::error::{StoreError, StoreResult};

/// SSL mode for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// No SSL.
    #[default]
    Disable,
    /// Use SSL if available, but don't require it.
    Prefer,
    /// Require SSL.
    Require,
    /// Require SSL and verify CA certificate.
    VerifyCa,
    /// Require SSL and verify CA and hostname.
    VerifyFull,
}

impl SslMode {
    /// Get the string representation for connection strings.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}

/// Configuration for the organization store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database server hostname or IP address.
    pub host: String,

    /// Database server port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    pub database: String,

    /// Database schema (defaults to "public").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// SSL mode.
    #[serde(default)]
    pub ssl_mode: SslMode,

    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl StoreConfig {
    /// Create a new store config with required fields.
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: None,
            database: database.into(),
            schema: None,
            username: username.into(),
            password: None,
            ssl_mode: SslMode::default(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }

    /// Set password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set SSL mode.
    #[must_use]
    pub fn with_ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = mode;
        self
    }

    /// Get the effective port (default if not specified).
    #[must_use]
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or(5432)
    }

    /// Get the effective schema (default if not specified).
    #[must_use]
    pub fn effective_schema(&self) -> &str {
        self.schema.as_deref().unwrap_or("public")
    }

    /// Check that the required fields are filled in.
    pub fn validate(&self) -> StoreResult<()> {
        if self.host.is_empty() {
            return Err(StoreError::validation("host is required"));
        }
        if self.database.is_empty() {
            return Err(StoreError::validation("database is required"));
        }
        if self.username.is_empty() {
            return Err(StoreError::validation("username is required"));
        }
        Ok(())
    }

    /// Build the connection URL for the pool.
    #[must_use]
    pub fn connection_url(&self) -> String {
        let mut url = format!(
            "postgresql://{}@{}:{}/{}",
            self.username,
            self.host,
            self.effective_port(),
            self.database
        );
        url.push_str(&format!("?sslmode={}", self.ssl_mode.as_str()));
        if let Some(schema) = &self.schema {
            url.push_str(&format!("&options=-c%20search_path={schema}"));
        }
        url
    }

    /// Open a connection pool with this configuration.
    pub async fn connect(&self) -> StoreResult<PgPool> {
        self.validate()?;

        let mut options = self
            .connection_url()
            .parse::<sqlx::postgres::PgConnectOptions>()
            .map_err(|e| StoreError::connection_with_source("invalid connection options", e))?;
        if let Some(password) = &self.password {
            options = options.password(password);
        }

        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| {
                StoreError::connection_with_source(
                    format!("failed to connect to {}:{}", self.host, self.effective_port()),
                    e,
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("db.example.com", "registry", "orgsync");
        assert_eq!(config.effective_port(), 5432);
        assert_eq!(config.effective_schema(), "public");
        assert_eq!(config.ssl_mode, SslMode::Disable);
        assert_eq!(config.max_connections, 5);
    }

    #[test]
    fn test_connection_url() {
        let config = StoreConfig::new("db.example.com", "registry", "orgsync")
            .with_port(5433)
            .with_schema("register")
            .with_ssl_mode(SslMode::Require);

        assert_eq!(
            config.connection_url(),
            "postgresql://orgsync@db.example.com:5433/registry?sslmode=require&options=-c%20search_path=register"
        );
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let config = StoreConfig::new("", "registry", "orgsync");
        assert!(config.validate().is_err());

        let config = StoreConfig::new("db.example.com", "registry", "");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_defaults_apply() {
        let config: StoreConfig = serde_json::from_str(
            r#"{"host": "localhost", "database": "registry", "username": "orgsync"}"#,
        )
        .unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.ssl_mode, SslMode::Disable);
    }
}
