//! Verification session state machine.
//!
//! `SendingInitialCode → AwaitingInput → Verifying → {Verified | back to
//! AwaitingInput}`. At most one code is issued per session unless the user
//! explicitly resends; the guard is an explicit session-scoped flag, so
//! re-entrant setup under strict re-render semantics still issues only once.

use chrono::{DateTime, Duration, Utc};

use crate::collaborators::{CodeDelivery, VerifyOutcome};

use super::cells::{CODE_LEN, CodeCells};

/// Seconds before resend is re-enabled after an issuance.
pub const RESEND_COOLDOWN_SECS: i64 = 60;

const GENERIC_SEND_ERROR: &str = "Could not send the verification code. Please try again.";
const GENERIC_VERIFY_ERROR: &str = "Verification failed. Please try again.";

/// The backend reuses a shared credential-check path whose default wording
/// is misleading here.
const MISLEADING_CREDENTIAL_MESSAGE: &str = "Incorrect password";
const OTP_MESSAGE: &str = "Incorrect OTP";

/// Phase of the verification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyPhase {
    SendingInitialCode,
    AwaitingInput,
    Verifying,
    Verified,
}

/// Result of one code submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyAttempt {
    Verified,
    /// Rejected with a user-facing message; the session is back at
    /// `AwaitingInput`.
    Rejected(String),
    /// Not all six cells are filled; no collaborator call was made.
    Incomplete,
}

/// One verification challenge bound to an email and an optional pending-job
/// reference. Exactly one may be outstanding per workflow session.
#[derive(Debug)]
pub struct VerificationSession {
    email: String,
    pending_ref: Option<String>,
    phase: VerifyPhase,
    cells: CodeCells,
    issued: bool,
    resend_available_at: Option<DateTime<Utc>>,
    notice: Option<String>,
}

impl VerificationSession {
    pub fn new(email: &str, pending_ref: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            pending_ref: pending_ref.map(str::to_string),
            phase: VerifyPhase::SendingInitialCode,
            cells: CodeCells::new(),
            issued: false,
            resend_available_at: None,
            notice: None,
        }
    }

    pub fn phase(&self) -> VerifyPhase {
        self.phase
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn cells(&self) -> &CodeCells {
        &self.cells
    }

    /// Mutable access for typing/backspace/paste while awaiting input.
    pub fn cells_mut(&mut self) -> &mut CodeCells {
        &mut self.cells
    }

    /// Take the pending transient notice (send failures), if any.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Issue the initial code. Idempotent: a second call is a no-op, so
    /// re-entrant invocation issues at most one code.
    pub async fn ensure_code_sent(&mut self, delivery: &dyn CodeDelivery, now: DateTime<Utc>) {
        if self.issued {
            return;
        }
        self.issued = true;
        self.issue(delivery, now).await;
        self.phase = VerifyPhase::AwaitingInput;
    }

    /// Explicit resend. Clears entered digits and resets the cooldown.
    /// Returns `false` while the cooldown is still running.
    pub async fn resend(&mut self, delivery: &dyn CodeDelivery, now: DateTime<Utc>) -> bool {
        if self.phase == VerifyPhase::Verified || !self.resend_available(now) {
            return false;
        }
        self.cells.clear();
        self.issue(delivery, now).await;
        true
    }

    async fn issue(&mut self, delivery: &dyn CodeDelivery, now: DateTime<Utc>) {
        self.resend_available_at = Some(now + Duration::seconds(RESEND_COOLDOWN_SECS));
        if let Err(e) = delivery
            .issue(&self.email, self.pending_ref.as_deref())
            .await
        {
            // Non-fatal: surface a transient notice and leave resend
            // possible once the countdown elapses.
            tracing::warn!(email = %self.email, error = %e, "code issuance failed");
            self.notice = Some(e.user_message(GENERIC_SEND_ERROR));
        }
    }

    /// Whether the resend control is enabled.
    pub fn resend_available(&self, now: DateTime<Utc>) -> bool {
        match self.resend_available_at {
            Some(at) => now >= at,
            None => false,
        }
    }

    /// Seconds left on the resend countdown (0 when available).
    pub fn resend_remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        match self.resend_available_at {
            Some(at) => (at - now).num_seconds().max(0),
            None => RESEND_COOLDOWN_SECS,
        }
    }

    /// Submit the entered code. Requires all six cells filled.
    pub async fn submit_code(&mut self, delivery: &dyn CodeDelivery) -> VerifyAttempt {
        if self.phase == VerifyPhase::Verified {
            return VerifyAttempt::Verified;
        }
        if self.phase == VerifyPhase::Verifying {
            // One attempt in flight at a time.
            return VerifyAttempt::Incomplete;
        }
        let Some(code) = self.cells.code() else {
            return VerifyAttempt::Incomplete;
        };
        let code = code.trim().to_string();
        if code.len() != CODE_LEN {
            return VerifyAttempt::Incomplete;
        }

        self.phase = VerifyPhase::Verifying;
        match delivery
            .verify(&self.email, &code, self.pending_ref.as_deref())
            .await
        {
            Ok(VerifyOutcome::Accepted) => {
                self.phase = VerifyPhase::Verified;
                VerifyAttempt::Verified
            }
            Ok(VerifyOutcome::Rejected(reason)) => {
                // Structured rejection: clear all cells and refocus cell 0.
                self.cells.clear();
                self.phase = VerifyPhase::AwaitingInput;
                let message = reason.unwrap_or_else(|| GENERIC_VERIFY_ERROR.to_string());
                VerifyAttempt::Rejected(remap_credential_wording(message))
            }
            Err(e) => {
                // Transport/validation error: input is preserved.
                self.phase = VerifyPhase::AwaitingInput;
                let message = e.user_message(GENERIC_VERIFY_ERROR);
                VerifyAttempt::Rejected(remap_credential_wording(message))
            }
        }
    }
}

fn remap_credential_wording(message: String) -> String {
    if message == MISLEADING_CREDENTIAL_MESSAGE {
        OTP_MESSAGE.to_string()
    } else {
        message
    }
}
