//! The challenge message a user signs to prove control of an address.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::Timestamp;

/// Prefix used when no other is configured.
pub const DEFAULT_CHALLENGE_PREFIX: &str = "I visited this site on";

/// An immutable challenge string stamped with the time it was issued.
///
/// Once built, the text never changes: the same value must be handed to both
/// the signer and the verifier, since recovery depends on every byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeMessage {
    text: String,
    issued_at: Timestamp,
}

impl ChallengeMessage {
    /// Build `"<prefix> <time>"` for the given issue time.
    pub fn new(prefix: &str, issued_at: Timestamp) -> Self {
        Self {
            text: format!("{} {}", prefix.trim_end(), issued_at.format_utc()),
            issued_at,
        }
    }

    /// Challenge with the default prefix.
    pub fn issued_at(issued_at: Timestamp) -> Self {
        Self::new(DEFAULT_CHALLENGE_PREFIX, issued_at)
    }

    /// The exact text to sign and verify.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> Timestamp {
        self.issued_at
    }
}

impl fmt::Display for ChallengeMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
