//! PostgreSQL-backed one-time-code delivery.
//!
//! Codes are 6 random digits, stored as SHA-256 digests with a short expiry.
//! Issuing deletes any outstanding code for the email first, so a resend
//! invalidates the previous code server-side. Verification consumes the code
//! on success.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::info;

use quotedesk_core::collaborators::{CodeDelivery, CollaboratorError, VerifyOutcome};

use crate::error::BackendError;

/// Minutes before an issued code expires.
const CODE_TTL_MINUTES: i64 = 10;

/// `CodeDelivery` over a PostgreSQL pool plus an HTTP mail endpoint.
pub struct PgCodeDelivery {
    pool: PgPool,
    client: reqwest::Client,
    mail_endpoint: String,
}

#[derive(serde::Serialize)]
struct CodeMail<'a> {
    email: &'a str,
    code: &'a str,
}

impl PgCodeDelivery {
    pub fn new(pool: PgPool, mail_endpoint: &str) -> Self {
        Self {
            pool,
            client: reqwest::Client::new(),
            mail_endpoint: mail_endpoint.to_string(),
        }
    }

    async fn issue_code(&self, email: &str, pending_ref: Option<&str>) -> Result<(), BackendError> {
        let code = generate_code();
        let code_hash = hash_code(&code);
        let expires_at = Utc::now() + Duration::minutes(CODE_TTL_MINUTES);

        // One outstanding code per email: issuing invalidates the previous.
        sqlx::query("DELETE FROM email_codes WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "INSERT INTO email_codes (id, email, code_hash, pending_ref, expires_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(uuid::Uuid::now_v7())
        .bind(email)
        .bind(&code_hash)
        .bind(pending_ref)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        let response = self
            .client
            .post(&self.mail_endpoint)
            .json(&CodeMail {
                email,
                code: &code,
            })
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BackendError::Http(format!(
                "code mail endpoint answered {}",
                response.status()
            )));
        }

        info!(email, "verification code issued");
        Ok(())
    }

    async fn check_code(
        &self,
        email: &str,
        code: &str,
        pending_ref: Option<&str>,
    ) -> Result<VerifyOutcome, BackendError> {
        let row = sqlx::query_as::<_, (String, String, Option<String>)>(
            "SELECT id::text, code_hash, pending_ref FROM email_codes \
             WHERE email = $1 AND expires_at > now()",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, stored_hash, stored_ref)) = row else {
            return Ok(VerifyOutcome::Rejected(Some(
                "Code expired — request a new one".into(),
            )));
        };
        if !challenge_matches(&stored_hash, stored_ref.as_deref(), code, pending_ref) {
            return Ok(VerifyOutcome::Rejected(Some("Incorrect code".into())));
        }

        // Consume on success.
        sqlx::query("DELETE FROM email_codes WHERE id = $1::uuid")
            .bind(&id)
            .execute(&self.pool)
            .await?;
        Ok(VerifyOutcome::Accepted)
    }
}

#[async_trait]
impl CodeDelivery for PgCodeDelivery {
    async fn issue(&self, email: &str, pending_ref: Option<&str>) -> Result<(), CollaboratorError> {
        self.issue_code(email, pending_ref)
            .await
            .map_err(CollaboratorError::from)
    }

    async fn verify(
        &self,
        email: &str,
        code: &str,
        pending_ref: Option<&str>,
    ) -> Result<VerifyOutcome, CollaboratorError> {
        self.check_code(email, code, pending_ref)
            .await
            .map_err(CollaboratorError::from)
    }
}

/// Random zero-padded 6-digit code.
fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}

/// SHA-256 hex digest of a code for storage.
fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A challenge matches when the code's digest equals the stored one and the
/// attempt carries the same pending-job reference the code was issued for.
fn challenge_matches(
    stored_hash: &str,
    stored_ref: Option<&str>,
    code: &str,
    pending_ref: Option<&str>,
) -> bool {
    hash_code(code) == stored_hash && stored_ref == pending_ref
}
