//! Intake flow orchestrator.
//!
//! Drives the hand-offs between the wizard, the verification protocol,
//! identity binding, and the submission coordinator:
//! `Collecting → [Verifying → Identifying] → Submitting → Confirmed`.
//! An already-authenticated caller skips straight from collection to
//! submission.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::attribution::{self, AttributionStore};
use crate::collaborators::{AccountDirectory, CodeDelivery, JobStore, Notifier};
use crate::identity::{BindOutcome, IdentitySession};
use crate::models::{AuthSubject, JobDraft};
use crate::otp::{VerificationSession, VerifyAttempt};
use crate::submission::{
    Confirmation, SubmissionCoordinator, SubmissionError, SubmissionReceipt,
};
use crate::wizard::{self, Progress, StepOutcome, WizardAction};

/// Phase of the overall intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collecting,
    Verifying,
    Identifying,
    Submitting,
    Confirmed,
}

/// One visitor's journey from empty draft to confirmed job.
pub struct IntakeFlow {
    draft: JobDraft,
    phase: Phase,
    verification: Option<VerificationSession>,
    identity: Option<IdentitySession>,
    subject: Option<AuthSubject>,
    coordinator: SubmissionCoordinator,
    confirmation: Option<Confirmation>,
}

impl Default for IntakeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeFlow {
    /// Flow for an anonymous visitor.
    pub fn new() -> Self {
        Self {
            draft: JobDraft::new(),
            phase: Phase::Collecting,
            verification: None,
            identity: None,
            subject: None,
            coordinator: SubmissionCoordinator::new(),
            confirmation: None,
        }
    }

    /// Flow for a signed-in caller: known identity fields are pre-populated
    /// and verification/identity phases are skipped.
    pub fn for_signed_in(subject: AuthSubject) -> Self {
        let name = subject.display_name.as_deref().unwrap_or_default();
        Self {
            draft: JobDraft::for_signed_in(name, &subject.email),
            subject: Some(subject),
            ..Self::new()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn draft(&self) -> &JobDraft {
        &self.draft
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// Dispatch a wizard action. A no-op outside the collection phase.
    pub fn dispatch(&mut self, action: WizardAction) -> StepOutcome {
        if self.phase != Phase::Collecting {
            return StepOutcome::default();
        }
        wizard::apply(&mut self.draft, action)
    }

    /// Progress indicator: the wizard formula during collection, pinned at
    /// 100 once control leaves the data-collection phase.
    pub fn progress(&self) -> Progress {
        match self.phase {
            Phase::Collecting => wizard::progress(&self.draft),
            Phase::Verifying => Progress {
                label: "Verify your email",
                percent: 100,
            },
            Phase::Identifying => Progress {
                label: "Your account",
                percent: 100,
            },
            Phase::Submitting => Progress {
                label: "Submitting",
                percent: 100,
            },
            Phase::Confirmed => Progress {
                label: "Request received",
                percent: 100,
            },
        }
    }

    /// Leave the collection phase once the final step is valid.
    ///
    /// Authenticated callers hand off directly to submission; anonymous
    /// callers enter verification, where the initial code is issued at most
    /// once. Returns `false` (and stays in collection) while the final step
    /// is incomplete.
    pub async fn finish_collection(
        &mut self,
        delivery: &dyn CodeDelivery,
        now: DateTime<Utc>,
    ) -> bool {
        if self.phase != Phase::Collecting {
            return false;
        }
        let Some(category) = self.draft.category else {
            return false;
        };
        let on_final = self.draft.step_index + 1 == wizard::total_steps(category);
        if !on_final || !wizard::can_advance(&self.draft) {
            return false;
        }

        if self.subject.is_some() {
            self.phase = Phase::Submitting;
            return true;
        }

        let mut session = VerificationSession::new(&self.draft.contact.email, None);
        session.ensure_code_sent(delivery, now).await;
        self.verification = Some(session);
        self.phase = Phase::Verifying;
        true
    }

    /// The active verification session, while verifying.
    pub fn verification_mut(&mut self) -> Option<&mut VerificationSession> {
        self.verification.as_mut()
    }

    /// Submit the entered code; on success, move on to identity resolution.
    pub async fn submit_code(&mut self, delivery: &dyn CodeDelivery) -> Option<VerifyAttempt> {
        if self.phase != Phase::Verifying {
            return None;
        }
        let session = self.verification.as_mut()?;
        let attempt = session.submit_code(delivery).await;
        if attempt == VerifyAttempt::Verified {
            self.identity = Some(IdentitySession::new(
                &self.draft.contact.email,
                &self.draft.contact.name,
            ));
            self.verification = None;
            self.phase = Phase::Identifying;
        }
        Some(attempt)
    }

    /// Run the one-time existence check for the identity phase.
    pub async fn resolve_identity(&mut self, directory: &dyn AccountDirectory) -> Option<bool> {
        if self.phase != Phase::Identifying {
            return None;
        }
        let session = self.identity.as_mut()?;
        Some(session.resolve(directory).await.is_existing_user)
    }

    /// Submit the password; on success, hand off to submission.
    pub async fn submit_credentials(
        &mut self,
        directory: &dyn AccountDirectory,
        password: &str,
    ) -> Option<BindOutcome> {
        if self.phase != Phase::Identifying {
            return None;
        }
        let session = self.identity.as_mut()?;
        let outcome = session.submit_credentials(directory, password).await;
        if let BindOutcome::Bound(subject) = &outcome {
            self.subject = Some(subject.clone());
            self.identity = None;
            self.phase = Phase::Submitting;
        }
        Some(outcome)
    }

    /// Run the submission transaction. Attribution is read from the store at
    /// this moment, applying the 30-day window.
    pub async fn submit(
        &mut self,
        jobs: &dyn JobStore,
        notifier: Arc<dyn Notifier>,
        store: &dyn AttributionStore,
        now: DateTime<Utc>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if self.phase != Phase::Submitting {
            return Err(SubmissionError::DraftIncomplete);
        }
        let subject = self
            .subject
            .clone()
            .ok_or(SubmissionError::DraftIncomplete)?;
        let referred_by = attribution::referred_by_listing_id(store, now);

        let receipt = self
            .coordinator
            .submit(&self.draft, &subject, referred_by, jobs, notifier)
            .await?;
        self.confirmation = Some(receipt.confirmation.clone());
        self.phase = Phase::Confirmed;
        Ok(receipt)
    }
}
