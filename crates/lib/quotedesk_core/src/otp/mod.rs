//! One-time-code email verification protocol.
//!
//! Binds a human-entered 6-digit code to an email address and an optional
//! pending-job reference, with resend throttling. The cell-input model lives
//! in [`cells`]; the session state machine in [`session`].

pub mod cells;
pub mod session;

pub use cells::{CODE_LEN, CodeCells};
pub use session::{RESEND_COOLDOWN_SECS, VerificationSession, VerifyAttempt, VerifyPhase};
