//! # quotedesk_backends
//!
//! Production implementations of the `quotedesk_core` collaborator traits:
//! PostgreSQL-backed accounts, one-time codes, and job persistence, plus an
//! HTTP notification client.

pub mod accounts;
pub mod config;
pub mod error;
pub mod jobs;
pub mod migrate;
pub mod notify;
pub mod otp;

pub use accounts::PgAccountDirectory;
pub use config::BackendConfig;
pub use error::BackendError;
pub use jobs::PgJobStore;
pub use notify::HttpNotifier;
pub use otp::PgCodeDelivery;
