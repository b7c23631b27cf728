//! Identity resolution and account binding.
//!
//! Decides sign-in vs. sign-up for a verified email exactly once per
//! session, then executes the chosen authentication action. The existence
//! check fails open toward sign-up: a lookup error is treated as "does not
//! exist" rather than blocking the flow (an existing email then surfaces as
//! a sign-up rejection).

use tracing::warn;

use crate::collaborators::AccountDirectory;
use crate::models::AuthSubject;

/// Role granted to accounts created through the intake flow.
pub const DEFAULT_ROLE: &str = "submitter";

const GENERIC_AUTH_ERROR: &str = "Could not sign you in. Please try again.";

/// Outcome of the one-time existence check. Fixed for the remainder of the
/// session once it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityResolution {
    pub is_existing_user: bool,
}

/// Outcome of a credential submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    Bound(AuthSubject),
    /// Credentials rejected; the form stays resubmittable and the workflow
    /// does not advance.
    Rejected(String),
}

/// One identity-binding session for a verified email.
#[derive(Debug)]
pub struct IdentitySession {
    email: String,
    display_name: String,
    resolution: Option<IdentityResolution>,
}

impl IdentitySession {
    pub fn new(email: &str, display_name: &str) -> Self {
        Self {
            email: email.to_string(),
            display_name: display_name.to_string(),
            resolution: None,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// The fixed resolution, once the existence check has run.
    pub fn resolution(&self) -> Option<IdentityResolution> {
        self.resolution
    }

    /// Run the existence check. Memoized: the action is fixed once decided
    /// and is not re-evaluated mid-flow, even if the email field is edited
    /// without returning to the collection steps.
    pub async fn resolve(&mut self, directory: &dyn AccountDirectory) -> IdentityResolution {
        if let Some(resolution) = self.resolution {
            return resolution;
        }
        let is_existing_user = match directory.exists(&self.email).await {
            Ok(exists) => exists,
            Err(e) => {
                // Fails open toward sign-up.
                warn!(email = %self.email, error = %e, "existence lookup failed");
                false
            }
        };
        let resolution = IdentityResolution { is_existing_user };
        self.resolution = Some(resolution);
        resolution
    }

    /// Submit the single password field. Existing users sign in; new users
    /// sign up with the collected display name and the default role.
    pub async fn submit_credentials(
        &mut self,
        directory: &dyn AccountDirectory,
        password: &str,
    ) -> BindOutcome {
        let resolution = self.resolve(directory).await;
        let result = if resolution.is_existing_user {
            directory.sign_in(&self.email, password).await
        } else {
            directory
                .sign_up(&self.email, password, &self.display_name, DEFAULT_ROLE)
                .await
        };
        match result {
            Ok(subject) => BindOutcome::Bound(subject),
            Err(e) => BindOutcome::Rejected(e.user_message(GENERIC_AUTH_ERROR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::collaborators::CollaboratorError;

    #[derive(Default)]
    struct ScriptedDirectory {
        exists: Option<Result<bool, String>>,
        exists_calls: AtomicU32,
        sign_in_error: Option<String>,
        sign_up_error: Option<String>,
        sign_ups: Mutex<Vec<(String, String)>>, // (display_name, role)
    }

    #[async_trait]
    impl AccountDirectory for ScriptedDirectory {
        async fn exists(&self, _email: &str) -> Result<bool, CollaboratorError> {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            match &self.exists {
                Some(Ok(b)) => Ok(*b),
                Some(Err(msg)) => Err(CollaboratorError::Unavailable(msg.clone())),
                None => Ok(false),
            }
        }

        async fn sign_in(
            &self,
            email: &str,
            _password: &str,
        ) -> Result<AuthSubject, CollaboratorError> {
            match &self.sign_in_error {
                Some(msg) => Err(CollaboratorError::Rejected(msg.clone())),
                None => Ok(AuthSubject {
                    id: "user-1".into(),
                    email: email.into(),
                    display_name: None,
                }),
            }
        }

        async fn sign_up(
            &self,
            email: &str,
            _password: &str,
            display_name: &str,
            role: &str,
        ) -> Result<AuthSubject, CollaboratorError> {
            match &self.sign_up_error {
                Some(msg) => Err(CollaboratorError::Rejected(msg.clone())),
                None => {
                    self.sign_ups
                        .lock()
                        .unwrap()
                        .push((display_name.into(), role.into()));
                    Ok(AuthSubject {
                        id: "user-2".into(),
                        email: email.into(),
                        display_name: Some(display_name.into()),
                    })
                }
            }
        }
    }

    #[tokio::test]
    async fn resolution_is_fixed_after_first_check() {
        let directory = ScriptedDirectory {
            exists: Some(Ok(true)),
            ..ScriptedDirectory::default()
        };
        let mut session = IdentitySession::new("ada@example.com", "Ada");

        let first = session.resolve(&directory).await;
        let second = session.resolve(&directory).await;

        assert!(first.is_existing_user);
        assert_eq!(first, second);
        assert_eq!(1, directory.exists_calls.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn lookup_error_fails_open_to_sign_up() {
        let directory = ScriptedDirectory {
            exists: Some(Err("db down".into())),
            ..ScriptedDirectory::default()
        };
        let mut session = IdentitySession::new("ada@example.com", "Ada");

        let resolution = session.resolve(&directory).await;
        assert!(!resolution.is_existing_user);

        let outcome = session.submit_credentials(&directory, "hunter22").await;
        let BindOutcome::Bound(subject) = outcome else {
            panic!("expected sign-up to run");
        };
        assert_eq!("user-2", subject.id);
        assert_eq!(
            vec![("Ada".to_string(), DEFAULT_ROLE.to_string())],
            directory.sign_ups.lock().unwrap().clone()
        );
    }

    #[tokio::test]
    async fn existing_user_signs_in() {
        let directory = ScriptedDirectory {
            exists: Some(Ok(true)),
            ..ScriptedDirectory::default()
        };
        let mut session = IdentitySession::new("ada@example.com", "Ada");

        let outcome = session.submit_credentials(&directory, "hunter22").await;
        assert_eq!(
            BindOutcome::Bound(AuthSubject {
                id: "user-1".into(),
                email: "ada@example.com".into(),
                display_name: None,
            }),
            outcome
        );
        assert!(directory.sign_ups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_credentials_leave_the_form_resubmittable() {
        let directory = ScriptedDirectory {
            exists: Some(Ok(true)),
            sign_in_error: Some("Invalid credentials".into()),
            ..ScriptedDirectory::default()
        };
        let mut session = IdentitySession::new("ada@example.com", "Ada");

        let outcome = session.submit_credentials(&directory, "wrong").await;
        assert_eq!(
            BindOutcome::Rejected("Invalid credentials".into()),
            outcome
        );
        // Retrying with corrected credentials works without a new session.
        let directory_ok = ScriptedDirectory {
            exists: Some(Ok(true)),
            ..ScriptedDirectory::default()
        };
        let outcome = session.submit_credentials(&directory_ok, "right").await;
        assert!(matches!(outcome, BindOutcome::Bound(_)));
        // The resolution was not re-evaluated for the retry.
        assert_eq!(0, directory_ok.exists_calls.load(Ordering::SeqCst));
    }
}
