//! Configuration module for the portal.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::auth::password::check_hash;
use crate::{PortalError, Result};

/// Environment variable that overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "PORTAL_DATABASE_URL";

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty allows any origin without credentials).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string (e.g. `sqlite://data/portal.db`).
    #[serde(default = "default_db_url")]
    pub url: String,
}

fn default_db_url() -> String {
    "sqlite://data/portal.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_db_url(),
        }
    }
}

/// Session lifetime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Sessions idle longer than this are swept.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    /// Inactive sessions older than this (by creation time) are swept.
    #[serde(default = "default_inactive_grace")]
    pub inactive_grace_secs: u64,
    /// Interval between background sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Default retention window for the admin cleanups.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_idle_timeout() -> u64 {
    9 * 60 * 60 // 9 hours
}

fn default_inactive_grace() -> u64 {
    60 * 60 // 1 hour
}

fn default_sweep_interval() -> u64 {
    300 // 5 minutes
}

fn default_retention_days() -> u32 {
    30
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            inactive_grace_secs: default_inactive_grace(),
            sweep_interval_secs: default_sweep_interval(),
            retention_days: default_retention_days(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/portal.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Login credential configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Accept any password, for deployments that check it upstream.
    #[serde(default)]
    pub trust_upstream: bool,
    /// Username → Argon2 PHC hash.
    #[serde(default)]
    pub credentials: BTreeMap<String, String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session lifetime configuration.
    #[serde(default)]
    pub sessions: SessionsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Login credential configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PortalError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PortalError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `PORTAL_DATABASE_URL`: Override the database connection string
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(DATABASE_URL_ENV) {
            if !url.is_empty() {
                self.database.url = url;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(PortalError::Validation(
                "database.url must not be empty".to_string(),
            ));
        }
        if self.sessions.idle_timeout_secs == 0 {
            return Err(PortalError::Validation(
                "sessions.idle_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err(PortalError::Validation(
                "sessions.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }
        for (username, hash) in &self.auth.credentials {
            check_hash(hash).map_err(|e| {
                PortalError::Validation(format!("auth.credentials.{username}: {e}"))
            })?;
        }
        Ok(())
    }
}
