//! Collaborator boundaries consumed by the core workflow.
//!
//! Each external service the workflow touches is reached through one of these
//! dyn-compatible traits. Production implementations live in
//! `quotedesk_backends`; tests substitute in-memory mocks. Errors from
//! collaborators are never propagated uncaught to the embedding UI — every
//! call site maps them into a user-facing string via
//! [`CollaboratorError::user_message`].

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{JobRecord, ListingRef, NewJob};

/// Errors crossing a collaborator boundary.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The service answered with a structured rejection carrying a reason.
    #[error("{0}")]
    Rejected(String),

    /// Transport-level failure; no structured reason is available.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// Extract a user-facing message, falling back to `fallback` when no
    /// structured reason is available.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CollaboratorError::Rejected(m) if !m.is_empty() => m.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Outcome of a code-verification call that completed without transport
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Accepted,
    /// Not successful; carries the server-supplied reason when present.
    Rejected(Option<String>),
}

/// One-time-code delivery and verification service.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    /// Issue a fresh code to `email`, invalidating any previously issued
    /// code for the same address.
    async fn issue(&self, email: &str, pending_ref: Option<&str>)
    -> Result<(), CollaboratorError>;

    /// Check a human-entered code against the outstanding challenge.
    async fn verify(
        &self,
        email: &str,
        code: &str,
        pending_ref: Option<&str>,
    ) -> Result<VerifyOutcome, CollaboratorError>;
}

/// Account existence and authentication service.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Whether an account record exists for `email`.
    async fn exists(&self, email: &str) -> Result<bool, CollaboratorError>;

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<crate::models::AuthSubject, CollaboratorError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: &str,
    ) -> Result<crate::models::AuthSubject, CollaboratorError>;
}

/// Persistence service for job records and referral resolution.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Single atomic insert of a job record.
    async fn insert_job(&self, job: &NewJob) -> Result<JobRecord, CollaboratorError>;

    /// Resolve a referral marker (listing slug) to its durable identifier.
    async fn resolve_referral(&self, slug: &str) -> Result<ListingRef, CollaboratorError>;
}

/// Fire-and-forget notification service.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_job_live(
        &self,
        email: &str,
        name: &str,
        region: &str,
        job_id: &str,
        category: crate::models::JobCategory,
    ) -> Result<(), CollaboratorError>;
}
