//! Database configuration loaded from the environment.
//!
//! This module contains:
//! - `SslMode` - TLS preference for the MySQL connection
//! - `DbConfig` - Connection parameters read from `DB_*` variables
//! - `ConfigError` - Why a configuration could not be loaded

use thiserror::Error;

/// Environment variable holding the database server hostname.
pub const DB_HOST: &str = "DB_HOST";
/// Environment variable holding the database server port.
pub const DB_PORT: &str = "DB_PORT";
/// Environment variable holding the database user.
pub const DB_USER: &str = "DB_USER";
/// Environment variable holding the database password (may be empty).
pub const DB_PASSWORD: &str = "DB_PASSWORD";
/// Environment variable holding the database (schema) name.
pub const DB_NAME: &str = "DB_NAME";
/// Optional environment variable selecting the SSL mode.
pub const DB_SSL_MODE: &str = "DB_SSL_MODE";

/// SSL mode options for the database connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// No SSL connection
    Disable,
    /// Try SSL first, fall back to non-SSL
    #[default]
    Prefer,
    /// Require SSL, don't verify certificates
    Require,
    /// Require SSL and verify server certificate
    VerifyCa,
    /// Require SSL, verify certificate and hostname
    VerifyFull,
}

impl SslMode {
    /// Parse from an environment string. Unknown values fall back to `Prefer`.
    pub fn from_env_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "disable" | "disabled" => Self::Disable,
            "require" | "required" => Self::Require,
            "verify-ca" | "verify_ca" => Self::VerifyCa,
            "verify-full" | "verify_identity" => Self::VerifyFull,
            _ => Self::Prefer,
        }
    }
}

/// Reasons the configuration could not be loaded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required database environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid DB_PORT value {0:?}: expected a port number")]
    InvalidPort(String),
}

/// Connection parameters for the MySQL server.
///
/// Constructed once at startup and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Server hostname or IP address
    pub hostname: String,
    /// Server port
    pub port: u16,
    /// Username for authentication
    pub username: String,
    /// Password for authentication (may be empty)
    pub password: String,
    /// Database to connect to
    pub database: String,
    /// SSL mode for the connection
    pub ssl_mode: SslMode,
}

impl std::fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl DbConfig {
    /// Create server connection parameters with the default SSL mode.
    pub fn new(
        hostname: String,
        port: u16,
        username: String,
        password: String,
        database: String,
    ) -> Self {
        Self {
            hostname,
            port,
            username,
            password,
            database,
            ssl_mode: SslMode::default(),
        }
    }

    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    ///
    /// Host, port, user, and database name must be present and non-empty.
    /// Every missing variable is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        let hostname = get(DB_HOST);
        let port = get(DB_PORT);
        let username = get(DB_USER);
        let password = get(DB_PASSWORD);
        let database = get(DB_NAME);

        let missing: Vec<&'static str> = [
            (DB_HOST, &hostname),
            (DB_PORT, &port),
            (DB_USER, &username),
            (DB_NAME, &database),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(key, _)| key)
        .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port.clone()))?;

        let ssl_mode = lookup(DB_SSL_MODE)
            .map(|s| SslMode::from_env_str(&s))
            .unwrap_or_default();

        Ok(Self {
            hostname,
            port,
            username,
            password,
            database,
            ssl_mode,
        })
    }

    /// Human-readable `user@host:port/database`, never including the password.
    pub fn display_name(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.username, self.hostname, self.port, self.database
        )
    }
}
