//! The wizard reducer.
//!
//! All draft mutation goes through [`apply`], a pure `(draft, action)`
//! reducer. Derived values (the default postcode prefix from the county
//! selection) are explicit reducer logic, and the exclusive-sentinel advance
//! delay is surfaced as an outcome hint rather than slept on inside the
//! engine, keeping it synchronous and deterministic.

use std::time::Duration;

use crate::models::{FieldValue, JobCategory, JobDraft};

use super::counties;
use super::steps::{self, StepDescriptor, StepKind, field};

/// Delay hint returned when the exclusive sentinel auto-advances, so the
/// embedding UI can reflect the exclusive choice before transitioning.
pub const EXCLUSIVE_ADVANCE_DELAY: Duration = Duration::from_millis(400);

/// Minimum length of a postcode after stripping whitespace.
const POSTCODE_MIN_LEN: usize = 7;

/// Actions accepted by the reducer.
#[derive(Debug, Clone)]
pub enum WizardAction {
    /// Valid only at step 0; categories are mutually exclusive and
    /// irrevocable without restarting the draft.
    SelectCategory(JobCategory),
    /// Set a single-select field. Auto-advances when the field belongs to
    /// the current step.
    SetField { field: String, value: String },
    /// Toggle a multi-select option. The exclusive sentinel clears the other
    /// selections and auto-advances.
    ToggleOption { field: String, value: String },
    /// Merge contact details. Never auto-advances.
    SetContact {
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        postcode: Option<String>,
    },
    GoBack,
    GoForward,
}

/// What a reducer step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether `step_index` moved forward.
    pub advanced: bool,
    /// Present when the advance should be rendered after a short fixed
    /// delay (exclusive-sentinel selection).
    pub advance_after: Option<Duration>,
}

impl StepOutcome {
    fn none() -> Self {
        Self::default()
    }

    fn advanced() -> Self {
        Self {
            advanced: true,
            advance_after: None,
        }
    }
}

/// Current progress through the data-collection phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub label: &'static str,
    /// `round(100 * (step_index + 1) / total_steps)`; 0 before a category
    /// is chosen (the step total is not yet known).
    pub percent: u8,
}

/// Apply an action to the draft. Never fails: invalid actions are no-ops.
pub fn apply(draft: &mut JobDraft, action: WizardAction) -> StepOutcome {
    match action {
        WizardAction::SelectCategory(category) => select_category(draft, category),
        WizardAction::SetField { field, value } => set_field(draft, &field, value),
        WizardAction::ToggleOption { field, value } => toggle_option(draft, &field, &value),
        WizardAction::SetContact {
            name,
            email,
            phone,
            postcode,
        } => {
            if let Some(name) = name {
                draft.contact.name = name;
            }
            if let Some(email) = email {
                draft.contact.email = email;
            }
            if let Some(phone) = phone {
                draft.contact.phone = phone;
            }
            if let Some(postcode) = postcode {
                draft.contact.postcode = postcode;
            }
            StepOutcome::none()
        }
        WizardAction::GoBack => go_back(draft),
        WizardAction::GoForward => go_forward(draft),
    }
}

fn select_category(draft: &mut JobDraft, category: JobCategory) -> StepOutcome {
    if draft.step_index != 0 || draft.category.is_some() {
        return StepOutcome::none();
    }
    draft.category = Some(category);
    draft.step_index = 1;
    StepOutcome::advanced()
}

fn set_field(draft: &mut JobDraft, name: &str, value: String) -> StepOutcome {
    // Idempotence: re-selecting the current value neither mutates nor
    // advances a second time.
    if draft.field(name) == Some(value.as_str()) {
        return StepOutcome::none();
    }

    if name == field::COUNTY {
        derive_postcode_prefix(draft, &value);
    }
    draft
        .fields
        .insert(name.to_string(), FieldValue::One(value));

    // Single-select steps advance automatically on selection.
    if matches!(
        current_step(draft).map(|d| d.kind),
        Some(StepKind::Select { field, .. }) if field == name
    ) {
        advance(draft)
    } else {
        StepOutcome::none()
    }
}

/// Seed the postcode with the county's routing prefix, only while the
/// postal field is still empty.
fn derive_postcode_prefix(draft: &mut JobDraft, county: &str) {
    if draft.contact.postcode.is_empty() {
        if let Some(prefix) = counties::routing_prefix(county) {
            draft.contact.postcode = prefix.to_string();
        }
    }
}

fn toggle_option(draft: &mut JobDraft, name: &str, value: &str) -> StepOutcome {
    let Some(category) = draft.category else {
        return StepOutcome::none();
    };
    // The exclusive sentinel is defined by the field's descriptor, wherever
    // the field appears in the sequence.
    let exclusive = steps::step_sequence(category).iter().find_map(|d| match d.kind {
        StepKind::MultiSelect {
            field, exclusive, ..
        } if field == name => Some(exclusive),
        _ => None,
    });
    let Some(exclusive) = exclusive else {
        return StepOutcome::none();
    };

    let mut selected = draft.selections(name);
    if value == exclusive {
        // Exclusive choice: clear everything else and advance after the
        // fixed delay.
        selected.clear();
        selected.insert(value.to_string());
        draft
            .fields
            .insert(name.to_string(), FieldValue::Many(selected));

        if matches!(
            current_step(draft).map(|d| d.kind),
            Some(StepKind::MultiSelect { field, .. }) if field == name
        ) {
            let mut outcome = advance(draft);
            if outcome.advanced {
                outcome.advance_after = Some(EXCLUSIVE_ADVANCE_DELAY);
            }
            return outcome;
        }
        return StepOutcome::none();
    }

    // A concrete option displaces the sentinel.
    selected.remove(exclusive);
    if !selected.remove(value) {
        selected.insert(value.to_string());
    }
    draft
        .fields
        .insert(name.to_string(), FieldValue::Many(selected));
    StepOutcome::none()
}

fn go_back(draft: &mut JobDraft) -> StepOutcome {
    // The category step is not revisitable once a category is chosen.
    let floor = if draft.category.is_some() { 1 } else { 0 };
    if draft.step_index > floor {
        draft.step_index -= 1;
    }
    StepOutcome::none()
}

fn go_forward(draft: &mut JobDraft) -> StepOutcome {
    if can_advance(draft) {
        advance(draft)
    } else {
        StepOutcome::none()
    }
}

fn advance(draft: &mut JobDraft) -> StepOutcome {
    let Some(category) = draft.category else {
        return StepOutcome::none();
    };
    if draft.step_index + 1 < steps::total_steps(category) {
        draft.step_index += 1;
        StepOutcome::advanced()
    } else {
        StepOutcome::none()
    }
}

fn current_step(draft: &JobDraft) -> Option<&'static StepDescriptor> {
    steps::descriptor_at(draft.category?, draft.step_index)
}

/// Pure completion gate for the current step. Evaluated before forward
/// navigation and before submission.
pub fn can_advance(draft: &JobDraft) -> bool {
    let Some(category) = draft.category else {
        return false;
    };
    match steps::descriptor_at(category, draft.step_index).map(|d| d.kind) {
        None => true, // category step, already satisfied
        Some(StepKind::Select { field, .. }) => {
            draft.field(field).is_some_and(|v| !v.is_empty())
        }
        Some(StepKind::MultiSelect { field, .. }) => !draft.selections(field).is_empty(),
        Some(StepKind::Contact) => contact_complete(draft),
    }
}

fn contact_complete(draft: &JobDraft) -> bool {
    let contact = &draft.contact;
    if contact.name.trim().is_empty() || contact.phone.trim().is_empty() {
        return false;
    }
    if !plausible_email(&contact.email) {
        return false;
    }
    postcode_valid(&contact.postcode, draft.field(field::COUNTY))
}

fn plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

/// A postcode passes when its whitespace-stripped value is at least
/// [`POSTCODE_MIN_LEN`] characters and, when a routing prefix is known for
/// the selected county, starts with that prefix (case-insensitive).
fn postcode_valid(postcode: &str, county: Option<&str>) -> bool {
    let normalized: String = postcode
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
    if normalized.len() < POSTCODE_MIN_LEN {
        return false;
    }
    match county.and_then(counties::routing_prefix) {
        Some(prefix) => normalized.starts_with(prefix),
        None => true,
    }
}

/// Progress through the data-collection phase.
pub fn progress(draft: &JobDraft) -> Progress {
    let Some(category) = draft.category else {
        return Progress {
            label: "Choose a category",
            percent: 0,
        };
    };
    let total = steps::total_steps(category);
    let percent = (100.0 * (draft.step_index + 1) as f64 / total as f64).round() as u8;
    let label = steps::descriptor_at(category, draft.step_index)
        .map(|d| d.label)
        .unwrap_or("Choose a category");
    Progress { label, percent }
}
