//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_ADDR: &str = "127.0.0.1:8501";
const DEFAULT_DATABASE_URL: &str = "sqlite:learning_copilot.db?mode=rwc";
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 3600;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Sessions idle longer than this are dropped.
    pub session_idle_timeout: Duration,
    /// Directory served under `/static`.
    pub static_dir: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `COPILOT_ADDR` | Server bind address | `127.0.0.1:8501` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:learning_copilot.db?mode=rwc` |
    /// | `SESSION_IDLE_TIMEOUT_SECS` | Session idle timeout | `3600` |
    /// | `COPILOT_STATIC_DIR` | Static asset directory | this crate's `static/` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup("COPILOT_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url =
            lookup("SQLITE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let idle_secs = match lookup("SESSION_IDLE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidIdleTimeout(raw))?,
            None => DEFAULT_IDLE_TIMEOUT_SECS,
        };

        let static_dir = lookup("COPILOT_STATIC_DIR")
            .unwrap_or_else(|| concat!(env!("CARGO_MANIFEST_DIR"), "/static").to_string());

        Ok(Self {
            addr,
            database_url,
            session_idle_timeout: Duration::from_secs(idle_secs),
            static_dir,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid COPILOT_ADDR format")]
    InvalidAddr,

    #[error("Invalid SESSION_IDLE_TIMEOUT_SECS value: {0}")]
    InvalidIdleTimeout(String),
}
