//! Job draft and record models.
//!
//! `JobDraft` is the client-held, not-yet-persisted form state; `NewJob` is
//! the assembled payload handed to the persistence collaborator exactly once
//! per successful submission.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Top-level branch of the workflow. Fixes the remaining step sequence and is
/// immutable for the lifetime of a draft once chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    Domestic,
    Commercial,
    /// Single-category variant used by the alternate intake flow.
    AssessmentOnly,
}

impl JobCategory {
    /// Stable identifier used in persisted payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            JobCategory::Domestic => "domestic",
            JobCategory::Commercial => "commercial",
            JobCategory::AssessmentOnly => "assessment_only",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            JobCategory::Domestic => "Domestic",
            JobCategory::Commercial => "Commercial",
            JobCategory::AssessmentOnly => "Assessment only",
        }
    }
}

/// Value of a single wizard field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single-select fields hold one option.
    One(String),
    /// Multi-select checklists hold a set of options.
    Many(BTreeSet<String>),
}

impl FieldValue {
    /// Whether the field would satisfy its step's completion gate.
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::One(v) => !v.is_empty(),
            FieldValue::Many(set) => !set.is_empty(),
        }
    }
}

/// Contact details collected on the final data-collection step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub postcode: String,
}

/// The in-progress form state.
///
/// Mutated exclusively through [`crate::wizard::apply`]; discarded on
/// submission success or abandonment. Never persisted server-side while in
/// draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDraft {
    /// Chosen at step 0; `None` until then.
    pub category: Option<JobCategory>,
    /// Category-specific attributes keyed by field name.
    pub fields: BTreeMap<String, FieldValue>,
    pub contact: ContactDetails,
    /// Index into the active category's step sequence. Step 0 is category
    /// selection for every category.
    pub step_index: usize,
}

impl JobDraft {
    /// Empty draft for an anonymous visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft pre-populated with the known identity fields of a signed-in
    /// caller.
    pub fn for_signed_in(name: &str, email: &str) -> Self {
        Self {
            contact: ContactDetails {
                name: name.to_string(),
                email: email.to_string(),
                ..ContactDetails::default()
            },
            ..Self::default()
        }
    }

    /// Single-select value of a field, if set.
    pub fn field(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::One(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Multi-select values of a field. Empty when unset.
    pub fn selections(&self, name: &str) -> BTreeSet<String> {
        match self.fields.get(name) {
            Some(FieldValue::Many(set)) => set.clone(),
            _ => BTreeSet::new(),
        }
    }
}

/// Authenticated subject bound to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSubject {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

/// Resolved referral target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRef {
    pub id: String,
}

/// Payload for the single authoritative job insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewJob {
    pub category: JobCategory,
    /// Category-tagged attributes merged from the draft's fields.
    pub attributes: serde_json::Value,
    pub contact: ContactDetails,
    /// Subject id of the resolved identity.
    pub submitter_id: String,
    /// Attribution target, when a stored referral is still eligible.
    pub referred_by_listing_id: Option<String>,
    pub platform_fee_pence: u32,
    pub assessor_fee_pence: u32,
}

/// Persisted job record, as returned by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub category: JobCategory,
    pub submitter_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
