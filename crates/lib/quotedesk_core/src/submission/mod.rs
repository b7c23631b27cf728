//! Submission coordinator.
//!
//! Performs the single authoritative job insert and triggers the best-effort
//! confirmation email. The write's success is reported to the caller
//! immediately; the notification runs as a detached task whose failure is
//! merged into the already-returned confirmation state through a oneshot
//! channel — the job is live either way.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::collaborators::{JobStore, Notifier};
use crate::models::{AuthSubject, JobCategory, JobDraft, NewJob};
use crate::wizard::{self, steps::field};

/// Fixed fee constants per product line, in pence.
pub mod fees {
    pub const DOMESTIC_PLATFORM_FEE_PENCE: u32 = 900;
    pub const DOMESTIC_ASSESSOR_FEE_PENCE: u32 = 13_500;
    pub const COMMERCIAL_PLATFORM_FEE_PENCE: u32 = 2_400;
    pub const COMMERCIAL_ASSESSOR_FEE_PENCE: u32 = 45_000;
    pub const ASSESSMENT_PLATFORM_FEE_PENCE: u32 = 900;
    pub const ASSESSMENT_ASSESSOR_FEE_PENCE: u32 = 9_500;

    use crate::models::JobCategory;

    /// `(platform_fee, assessor_fee)` for a category.
    pub fn for_category(category: JobCategory) -> (u32, u32) {
        match category {
            JobCategory::Domestic => (DOMESTIC_PLATFORM_FEE_PENCE, DOMESTIC_ASSESSOR_FEE_PENCE),
            JobCategory::Commercial => {
                (COMMERCIAL_PLATFORM_FEE_PENCE, COMMERCIAL_ASSESSOR_FEE_PENCE)
            }
            JobCategory::AssessmentOnly => {
                (ASSESSMENT_PLATFORM_FEE_PENCE, ASSESSMENT_ASSESSOR_FEE_PENCE)
            }
        }
    }
}

const GENERIC_SUBMIT_ERROR: &str = "Could not submit your request. Please try again.";
const GENERIC_EMAIL_ERROR: &str = "Confirmation email could not be sent.";

/// Submission failures. The draft is preserved in every case so the user can
/// retry without re-entering data.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The final data-collection step's gate is not satisfied.
    #[error("The request is not complete")]
    DraftIncomplete,

    /// One submission attempt may be in flight at a time.
    #[error("A submission is already in progress")]
    InFlight,

    /// The job was already created in this session.
    #[error("This request was already submitted (job {0})")]
    AlreadySubmitted(String),

    /// Insert failed; no partial record is left behind.
    #[error("{0}")]
    Insert(String),
}

/// Terminal confirmation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub job_id: String,
    pub name: String,
    pub region: String,
    pub email: String,
    pub category: JobCategory,
    /// Present when the confirmation email failed; the job is live and the
    /// rest of the confirmation renders normally.
    pub email_error: Option<String>,
}

impl Confirmation {
    /// Merge the detached notification outcome into the confirmation state.
    pub fn merge_email_result(&mut self, result: Option<String>) {
        self.email_error = result;
    }
}

/// Receipt returned as soon as the job record exists.
pub struct SubmissionReceipt {
    pub confirmation: Confirmation,
    /// Resolves once the detached notification task finishes: `None` on
    /// success, `Some(detail)` on failure.
    pub email_result: oneshot::Receiver<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CoordinatorState {
    Idle,
    InFlight,
    Submitted(String),
}

/// Sole writer of the job record.
#[derive(Debug)]
pub struct SubmissionCoordinator {
    state: CoordinatorState,
}

impl Default for SubmissionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionCoordinator {
    pub fn new() -> Self {
        Self {
            state: CoordinatorState::Idle,
        }
    }

    /// The created job id, once submitted.
    pub fn job_id(&self) -> Option<&str> {
        match &self.state {
            CoordinatorState::Submitted(id) => Some(id),
            _ => None,
        }
    }

    /// Perform the creation transaction and dispatch the notification.
    ///
    /// Preconditions: the draft sits on its final step with `can_advance`
    /// true, and an identity is bound. At most one attempt runs at a time,
    /// and a session that already submitted refuses to insert again.
    pub async fn submit(
        &mut self,
        draft: &JobDraft,
        subject: &AuthSubject,
        referred_by_listing_id: Option<String>,
        jobs: &dyn JobStore,
        notifier: Arc<dyn Notifier>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        match &self.state {
            CoordinatorState::InFlight => return Err(SubmissionError::InFlight),
            CoordinatorState::Submitted(id) => {
                return Err(SubmissionError::AlreadySubmitted(id.clone()));
            }
            CoordinatorState::Idle => {}
        }
        let category = draft.category.ok_or(SubmissionError::DraftIncomplete)?;
        if !on_final_step(draft, category) || !wizard::can_advance(draft) {
            return Err(SubmissionError::DraftIncomplete);
        }

        let (platform_fee_pence, assessor_fee_pence) = fees::for_category(category);
        let job = NewJob {
            category,
            attributes: tagged_attributes(draft, category),
            contact: draft.contact.clone(),
            submitter_id: subject.id.clone(),
            referred_by_listing_id,
            platform_fee_pence,
            assessor_fee_pence,
        };

        self.state = CoordinatorState::InFlight;
        let record = match jobs.insert_job(&job).await {
            Ok(record) => record,
            Err(e) => {
                // Draft preserved; the insert is atomic so nothing partial
                // exists.
                self.state = CoordinatorState::Idle;
                return Err(SubmissionError::Insert(
                    e.user_message(GENERIC_SUBMIT_ERROR),
                ));
            }
        };
        self.state = CoordinatorState::Submitted(record.id.clone());
        info!(job_id = %record.id, category = category.as_str(), "job record created");

        let region = draft.field(field::COUNTY).unwrap_or_default().to_string();
        let confirmation = Confirmation {
            job_id: record.id.clone(),
            name: draft.contact.name.clone(),
            region: region.clone(),
            email: draft.contact.email.clone(),
            category,
            email_error: None,
        };

        // Detached: the job is already live, so a notification failure only
        // surfaces as the "email pending" banner.
        let (tx, rx) = oneshot::channel();
        let email = draft.contact.email.clone();
        let name = draft.contact.name.clone();
        let job_id = record.id.clone();
        tokio::spawn(async move {
            let result = match notifier
                .notify_job_live(&email, &name, &region, &job_id, category)
                .await
            {
                Ok(()) => None,
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "job-live notification failed");
                    Some(e.user_message(GENERIC_EMAIL_ERROR))
                }
            };
            // Receiver may have been dropped; nothing to do then.
            let _ = tx.send(result);
        });

        Ok(SubmissionReceipt {
            confirmation,
            email_result: rx,
        })
    }
}

fn on_final_step(draft: &JobDraft, category: JobCategory) -> bool {
    draft.step_index + 1 == wizard::total_steps(category)
}

/// Merge the draft's fields into a category-tagged payload.
fn tagged_attributes(draft: &JobDraft, category: JobCategory) -> Value {
    let mut map = Map::new();
    map.insert(
        "category".to_string(),
        Value::String(category.as_str().to_string()),
    );
    for (name, value) in &draft.fields {
        // FieldValue serializes as a bare string or array of strings.
        if let Ok(v) = serde_json::to_value(value) {
            map.insert(name.clone(), v);
        }
    }
    Value::Object(map)
}
