//! Environment-driven backend configuration.

use crate::error::BackendError;

/// Configuration for the PostgreSQL and HTTP backends.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Endpoint receiving job-live notification requests.
    pub notify_endpoint: String,
    /// Endpoint receiving one-time-code delivery requests.
    pub mail_endpoint: String,
}

impl BackendConfig {
    /// Load from the environment (a `.env` file is honored when present).
    pub fn from_env() -> Result<Self, BackendError> {
        dotenvy::dotenv().ok();
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            notify_endpoint: require("QUOTEDESK_NOTIFY_URL")?,
            mail_endpoint: require("QUOTEDESK_MAIL_URL")?,
        })
    }
}

fn require(key: &str) -> Result<String, BackendError> {
    std::env::var(key).map_err(|_| BackendError::Internal(format!("{key} is not set")))
}
