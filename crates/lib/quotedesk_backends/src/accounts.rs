//! PostgreSQL-backed account directory.
//!
//! Sign-in verifies bcrypt hashes and answers every mismatch with the same
//! generic rejection; sign-up validates, hashes with bcrypt (cost 10), and
//! grants the caller-supplied role.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use quotedesk_core::collaborators::{AccountDirectory, CollaboratorError};
use quotedesk_core::models::AuthSubject;

use crate::error::BackendError;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

/// `AccountDirectory` over a PostgreSQL pool.
pub struct PgAccountDirectory {
    pool: PgPool,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn email_exists(&self, email: &str) -> Result<bool, BackendError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthSubject, BackendError> {
        let row = sqlx::query_as::<_, (String, Option<String>, Option<String>)>(
            "SELECT id::text, display_name, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        // Same generic rejection for unknown email and wrong password.
        let (user_id, display_name, pw_hash) = row.ok_or(BackendError::Credential)?;
        let pw_hash = pw_hash.ok_or(BackendError::Credential)?;
        let valid = bcrypt::verify(password, &pw_hash)
            .map_err(|e| BackendError::Internal(format!("bcrypt verify: {e}")))?;
        if !valid {
            return Err(BackendError::Credential);
        }

        Ok(AuthSubject {
            id: user_id,
            email: email.to_string(),
            display_name,
        })
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: &str,
    ) -> Result<AuthSubject, BackendError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.email_exists(email).await? {
            return Err(BackendError::Validation("Email already registered".into()));
        }

        let pw_hash = bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| BackendError::Internal(format!("bcrypt hash: {e}")))?;

        let user_id = sqlx::query_scalar::<_, String>(
            "INSERT INTO users (email, display_name, password_hash) \
             VALUES ($1, $2, $3) RETURNING id::text",
        )
        .bind(email)
        .bind(display_name)
        .bind(&pw_hash)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1::uuid, $2)")
            .bind(&user_id)
            .bind(role)
            .execute(&self.pool)
            .await?;

        info!(email, role, "account created via intake flow");
        Ok(AuthSubject {
            id: user_id,
            email: email.to_string(),
            display_name: Some(display_name.to_string()),
        })
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn exists(&self, email: &str) -> Result<bool, CollaboratorError> {
        self.email_exists(email).await.map_err(CollaboratorError::from)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSubject, CollaboratorError> {
        self.login(email, password)
            .await
            .map_err(CollaboratorError::from)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        role: &str,
    ) -> Result<AuthSubject, CollaboratorError> {
        self.register(email, password, display_name, role)
            .await
            .map_err(CollaboratorError::from)
    }
}
