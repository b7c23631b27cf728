//! Step workflow engine.
//!
//! A closed set of data-collection steps per category, described by the
//! tagged-union descriptors in [`steps`] and interpreted by the pure reducer
//! in [`engine`]. There is no server round-trip anywhere in this module:
//! invalid input never raises an error, it simply blocks forward navigation
//! through [`engine::can_advance`].

pub mod counties;
pub mod engine;
pub mod steps;

pub use engine::{
    EXCLUSIVE_ADVANCE_DELAY, Progress, StepOutcome, WizardAction, apply, can_advance, progress,
};
pub use steps::{StepDescriptor, StepKind, descriptor_at, step_sequence, total_steps};
