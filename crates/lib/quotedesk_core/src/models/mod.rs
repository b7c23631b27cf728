//! Domain models shared across the intake workflow.

pub mod job;

pub use job::{
    AuthSubject, ContactDetails, FieldValue, JobCategory, JobDraft, JobRecord, ListingRef, NewJob,
};
