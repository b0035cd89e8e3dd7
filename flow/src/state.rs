//! Session state for one run of the identity proof.

use idproof_types::{ChallengeMessage, NetworkId, WalletAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::verify::Verification;

/// Where a session is in the connect → sign → verify sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStep {
    Idle,
    Connected,
    Signed,
    Verified,
}

impl FlowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connected => "connected",
            Self::Signed => "signed",
            Self::Verified => "verified",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which external call, if any, is in flight.
///
/// A step refuses to start while this is not [`Loading::Idle`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Loading {
    #[default]
    Idle,
    Connecting,
    Signing,
    Verifying,
}

impl Loading {
    /// Progress label for a pending step.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "Connecting...",
            Self::Signing => "Signing...",
            Self::Verifying => "Verifying...",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Everything one session knows.
///
/// Fields are only changed through [`crate::IdentityProofFlow`], which keeps
/// them consistent with `step`: an address exists from `Connected` on, a
/// signature from `Signed` on, and a verification result only at `Verified`.
/// The error overlay is independent of `step`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub(crate) challenge: ChallengeMessage,
    pub(crate) step: FlowStep,
    pub(crate) loading: Loading,
    pub(crate) address: Option<WalletAddress>,
    pub(crate) network: Option<NetworkId>,
    pub(crate) signature: Option<String>,
    pub(crate) recovered_address: Option<WalletAddress>,
    pub(crate) is_verified: Option<bool>,
    pub(crate) error: Option<String>,
}

impl SessionState {
    /// A fresh `Idle` session bound to `challenge`.
    pub fn new(challenge: ChallengeMessage) -> Self {
        Self {
            challenge,
            step: FlowStep::Idle,
            loading: Loading::Idle,
            address: None,
            network: None,
            signature: None,
            recovered_address: None,
            is_verified: None,
            error: None,
        }
    }

    /// The frozen challenge this session signs and verifies.
    pub fn challenge(&self) -> &ChallengeMessage {
        &self.challenge
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn loading(&self) -> Loading {
        self.loading
    }

    /// The address the wallet claims, once connected.
    pub fn address(&self) -> Option<&WalletAddress> {
        self.address.as_ref()
    }

    pub fn network(&self) -> Option<&NetworkId> {
        self.network.as_ref()
    }

    /// The signature hex returned by the wallet, once signed.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn recovered_address(&self) -> Option<&WalletAddress> {
        self.recovered_address.as_ref()
    }

    /// `None` until verified, then whether the recovered address matched.
    pub fn is_verified(&self) -> Option<bool> {
        self.is_verified
    }

    /// The most recent step failure, shown until the next step runs or a reset.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the session holds no connect/sign/verify data.
    pub fn is_idle(&self) -> bool {
        self.step == FlowStep::Idle
            && self.loading.is_idle()
            && self.address.is_none()
            && self.network.is_none()
            && self.signature.is_none()
            && self.recovered_address.is_none()
            && self.is_verified.is_none()
            && self.error.is_none()
    }

    pub(crate) fn apply_verification(&mut self, verification: &Verification) {
        self.recovered_address = Some(verification.recovered_address.clone());
        self.is_verified = Some(verification.is_verified);
        self.step = FlowStep::Verified;
    }

    /// Clear everything but the challenge.
    pub(crate) fn clear(&mut self) {
        let challenge = self.challenge.clone();
        *self = Self::new(challenge);
    }
}
