//! Printable summary of one `idproof run`.

use std::fmt;

use idproof_flow::{FlowStep, SessionState, Verification};
use idproof_types::ChallengeMessage;
use serde::Serialize;

/// Result of re-checking the signature against an altered challenge.
#[derive(Clone, Debug, Serialize)]
pub struct TamperCheck {
    pub message: String,
    #[serde(flatten)]
    pub verification: Verification,
}

/// What `run` prints: the final session plus run-level context.
#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    pub provider: Option<String>,
    #[serde(flatten)]
    pub session: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tamper_check: Option<TamperCheck>,
    /// Challenge held by the session after a reset, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_after_reset: Option<ChallengeMessage>,
}

impl SessionReport {
    pub fn new(provider: Option<&str>, session: SessionState) -> Self {
        Self {
            provider: provider.map(str::to_owned),
            session,
            tamper_check: None,
            challenge_after_reset: None,
        }
    }

    pub fn with_tamper_check(mut self, check: TamperCheck) -> Self {
        self.tamper_check = Some(check);
        self
    }

    pub fn with_reset(mut self, challenge: ChallengeMessage) -> Self {
        self.challenge_after_reset = Some(challenge);
        self
    }

    /// True when the session reached a positive verification without error.
    pub fn succeeded(&self) -> bool {
        self.session.error().is_none() && self.session.is_verified() == Some(true)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn verdict(verified: bool) -> &'static str {
    if verified {
        "Verified"
    } else {
        "Not Verified"
    }
}

fn mark(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.session;
        writeln!(f, "Challenge: {}", s.challenge())?;
        writeln!(
            f,
            "Provider:  {}",
            self.provider.as_deref().unwrap_or("none")
        )?;

        write!(f, "{} 1. Connect wallet", mark(s.step() >= FlowStep::Connected))?;
        if let Some(address) = s.address() {
            write!(f, "  {}", address.abbreviated())?;
            if let Some(network) = s.network() {
                write!(f, " on {network}")?;
            }
        }
        writeln!(f)?;

        write!(f, "{} 2. Sign message", mark(s.step() >= FlowStep::Signed))?;
        if let Some(signature) = s.signature() {
            write!(f, "  {signature}")?;
        }
        writeln!(f)?;

        write!(f, "{} 3. Verify signature", mark(s.step() >= FlowStep::Verified))?;
        if let (Some(verified), Some(recovered)) = (s.is_verified(), s.recovered_address()) {
            write!(f, "  {} (recovered {recovered})", verdict(verified))?;
        }
        writeln!(f)?;

        if let Some(check) = &self.tamper_check {
            writeln!(f, "Tampered message: {}", check.message)?;
            writeln!(
                f,
                "  {} (recovered {})",
                verdict(check.verification.is_verified),
                check.verification.recovered_address
            )?;
        }

        if let Some(error) = s.error() {
            writeln!(f, "Error: {error}")?;
        }

        if let Some(challenge) = &self.challenge_after_reset {
            let note = if challenge == s.challenge() {
                "kept"
            } else {
                "reissued"
            };
            writeln!(f, "Reset: challenge {note}: {challenge}")?;
        }
        Ok(())
    }
}
