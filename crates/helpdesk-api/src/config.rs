//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use helpdesk::{HelpdeskConfig, HelpdeskError};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Engine settings.
    pub helpdesk: HelpdeskConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `HELPDESK_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:helpdesk.db?mode=rwc` |
    /// | `HELPDESK_MAX_RADIUS_KM` | Assignment radius in km | unbounded |
    /// | `HELPDESK_RELEASE_ON_ASSIGN` | Toggle technician availability on assign/complete | `true` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("HELPDESK_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:helpdesk.db?mode=rwc".to_string());

        let helpdesk = HelpdeskConfig::from_env()?;

        Ok(Self {
            addr,
            database_url,
            helpdesk,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid HELPDESK_ADDR format")]
    InvalidAddr,

    #[error("Invalid helpdesk settings: {0}")]
    Helpdesk(#[from] HelpdeskError),
}
