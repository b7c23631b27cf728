//! # quotedesk_core
//!
//! Core intake-workflow logic for Quotedesk: the step wizard, the one-time
//! code verification protocol, identity resolution, referral attribution, and
//! the submission coordinator. External services (persistence, accounts, code
//! delivery, notification) are reached through the traits in
//! [`collaborators`]; this crate contains no database or HTTP code.

pub mod attribution;
pub mod collaborators;
pub mod flow;
pub mod identity;
pub mod models;
pub mod otp;
pub mod submission;
pub mod wizard;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
