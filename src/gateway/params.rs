//! Connection parameters and their validation.

use std::str::FromStr;

use crate::error::QueryToolError;

/// Default PostgreSQL port.
pub const DEFAULT_PORT: u16 = 5432;

/// Transport security mode, a subset of libpq's `sslmode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    Disable,
    /// Try TLS, fall back to plain TCP.
    #[default]
    Prefer,
    /// Require TLS without verifying the server certificate.
    Require,
}

impl SslMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }
}

impl FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            other => Err(format!(
                "unsupported sslmode '{}' (expected disable, prefer or require)",
                other
            )),
        }
    }
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters as typed by the user.
///
/// Fields are kept as raw strings so the form can hold partial input;
/// [`ConnectionParams::to_config`] trims and validates them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: SslMode,
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &if self.password.is_empty() { "" } else { "***" })
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl ConnectionParams {
    /// Builds parameters from the standard libpq environment variables:
    /// - PGHOST (default: localhost)
    /// - PGPORT (default: 5432)
    /// - PGUSER (default: $USER, empty if neither is set)
    /// - PGPASSWORD (default: empty)
    /// - PGDATABASE (default: empty, the server then uses the user name)
    /// - PGSSLMODE (default: prefer; unsupported values are rejected)
    pub fn from_env() -> Result<Self, QueryToolError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ConnectionParams::from_env`] over an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, QueryToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ssl_mode = match lookup("PGSSLMODE") {
            Some(raw) => raw
                .parse()
                .map_err(|e| QueryToolError::Validation(format!("PGSSLMODE: {}", e)))?,
            None => SslMode::default(),
        };

        Ok(Self {
            host: lookup("PGHOST").unwrap_or_else(|| "localhost".to_string()),
            port: lookup("PGPORT").unwrap_or_else(|| DEFAULT_PORT.to_string()),
            database: lookup("PGDATABASE").unwrap_or_default(),
            user: lookup("PGUSER").or_else(|| lookup("USER")).unwrap_or_default(),
            password: lookup("PGPASSWORD").unwrap_or_default(),
            ssl_mode,
        })
    }

    /// Parsed port; blank means the default port.
    pub fn port_number(&self) -> Result<u16, QueryToolError> {
        let port = self.port.trim();
        if port.is_empty() {
            return Ok(DEFAULT_PORT);
        }
        match port.parse::<u16>() {
            Ok(0) | Err(_) => Err(QueryToolError::Validation(format!(
                "invalid port '{}'",
                port
            ))),
            Ok(n) => Ok(n),
        }
    }

    /// Database name to connect to; blank falls back to the user name.
    pub fn database_name(&self) -> &str {
        let database = self.database.trim();
        if database.is_empty() {
            self.user.trim()
        } else {
            database
        }
    }

    /// Checks the non-blank requirements and the port format.
    pub fn validate(&self) -> Result<(), QueryToolError> {
        if self.host.trim().is_empty() {
            return Err(QueryToolError::Validation("host is required".to_string()));
        }
        if self.user.trim().is_empty() {
            return Err(QueryToolError::Validation("user is required".to_string()));
        }
        self.port_number().map(|_| ())
    }

    /// Builds a driver configuration after validation.
    pub fn to_config(&self) -> Result<postgres::Config, QueryToolError> {
        self.validate()?;

        let mut config = postgres::Config::new();
        config
            .host(self.host.trim())
            .port(self.port_number()?)
            .user(self.user.trim())
            .dbname(self.database_name())
            .application_name("pgxplain")
            .ssl_mode(match self.ssl_mode {
                SslMode::Disable => postgres::config::SslMode::Disable,
                SslMode::Prefer => postgres::config::SslMode::Prefer,
                SslMode::Require => postgres::config::SslMode::Require,
            });

        // Password is sent verbatim, surrounding spaces included.
        if !self.password.is_empty() {
            config.password(self.password.as_str());
        }

        Ok(config)
    }

    /// Short `user@host:port/db` description for logs and the status bar.
    pub fn describe(&self) -> String {
        format!(
            "{}@{}:{}/{}",
            self.user.trim(),
            self.host.trim(),
            self.port_number().unwrap_or(DEFAULT_PORT),
            self.database_name()
        )
    }
}
