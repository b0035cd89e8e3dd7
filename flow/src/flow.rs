//! The identity proof state machine.
//!
//! `Idle → Connected → Signed → Verified`, with `reset` returning to `Idle`
//! from anywhere. Each operation takes the session by `&mut`, runs to
//! completion, and on failure leaves every field except the error overlay as it
//! was.

use std::sync::Arc;

use idproof_types::{ChallengeMessage, DEFAULT_CHALLENGE_PREFIX};
use idproof_utils::{Clock, SystemClock};
use serde::{Deserialize, Serialize};

use crate::error::{message_or, FlowError, CONNECT_FALLBACK, SIGN_FALLBACK};
use crate::provider::{Accounts, ProviderError, WalletProvider};
use crate::state::{FlowStep, Loading, SessionState};
use crate::verify::{recover_address, Verification};

/// What happens to the challenge message on reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePolicy {
    /// Keep the challenge issued when the session started.
    #[default]
    KeepOnReset,
    /// Issue a new challenge stamped with the current time.
    RegenerateOnReset,
}

/// Tunables for a flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Text placed before the timestamp in every challenge.
    #[serde(default = "default_prefix")]
    pub challenge_prefix: String,

    #[serde(default)]
    pub challenge_policy: ChallengePolicy,
}

fn default_prefix() -> String {
    DEFAULT_CHALLENGE_PREFIX.to_string()
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            challenge_prefix: default_prefix(),
            challenge_policy: ChallengePolicy::default(),
        }
    }
}

/// Drives sessions against one wallet provider.
pub struct IdentityProofFlow {
    provider: Option<Arc<dyn WalletProvider>>,
    clock: Arc<dyn Clock>,
    config: FlowConfig,
}

impl IdentityProofFlow {
    /// A flow over `provider`; `None` models an environment with no wallet installed.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            clock: Arc::new(SystemClock),
            config: FlowConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    /// Name of the installed provider, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_deref().map(|p| p.name())
    }

    fn issue_challenge(&self) -> ChallengeMessage {
        ChallengeMessage::new(&self.config.challenge_prefix, self.clock.now())
    }

    /// Begin a session, freezing its challenge message.
    pub fn start_session(&self) -> SessionState {
        let state = SessionState::new(self.issue_challenge());
        tracing::debug!(challenge = %state.challenge(), "session started");
        state
    }

    fn provider(&self) -> Result<&Arc<dyn WalletProvider>, FlowError> {
        self.provider.as_ref().ok_or(FlowError::ProviderUnavailable)
    }

    fn ensure_not_busy(state: &SessionState) -> Result<(), FlowError> {
        if state.loading.is_idle() {
            Ok(())
        } else {
            Err(FlowError::Busy(state.loading))
        }
    }

    /// Record a step failure in the overlay and hand it back.
    fn fail(state: &mut SessionState, err: FlowError) -> FlowError {
        tracing::warn!(step = %state.step, "{err}");
        state.error = Some(err.to_string());
        err
    }

    /// Request account access from the wallet.
    ///
    /// Only valid from `Idle`. On success the session moves to `Connected`.
    pub async fn connect(&self, state: &mut SessionState) -> Result<Accounts, FlowError> {
        Self::ensure_not_busy(state)?;
        if state.step != FlowStep::Idle {
            return Err(FlowError::AlreadyConnected);
        }
        state.error = None;

        let provider = match self.provider() {
            Ok(p) => Arc::clone(p),
            Err(e) => return Err(Self::fail(state, e)),
        };

        state.loading = Loading::Connecting;
        let result = provider.request_accounts().await;
        state.loading = Loading::Idle;

        match result {
            Ok(accounts) => {
                tracing::info!(
                    address = %accounts.address,
                    network = %accounts.network,
                    "wallet connected"
                );
                state.address = Some(accounts.address.clone());
                state.network = Some(accounts.network.clone());
                state.step = FlowStep::Connected;
                Ok(accounts)
            }
            Err(e) => {
                let err = match e {
                    ProviderError::Unavailable => FlowError::ProviderUnavailable,
                    ProviderError::Rejected(m) => {
                        FlowError::UserRejected(message_or(m, CONNECT_FALLBACK))
                    }
                    ProviderError::Failed(m) => {
                        FlowError::ProviderError(message_or(m, CONNECT_FALLBACK))
                    }
                };
                Err(Self::fail(state, err))
            }
        }
    }

    /// Have the wallet sign the session's challenge.
    ///
    /// Valid from `Connected` on; before that no provider call is made.
    /// Signing again replaces the signature and drops any earlier verification.
    pub async fn sign(&self, state: &mut SessionState) -> Result<String, FlowError> {
        Self::ensure_not_busy(state)?;
        if state.step < FlowStep::Connected || state.address.is_none() {
            return Err(FlowError::NotConnected);
        }
        state.error = None;

        let provider = match self.provider() {
            Ok(p) => Arc::clone(p),
            Err(e) => return Err(Self::fail(state, e)),
        };

        state.loading = Loading::Signing;
        let message = state.challenge.as_str().to_owned();
        let result = provider.sign_message(&message).await;
        state.loading = Loading::Idle;

        match result {
            Ok(signature) => {
                tracing::info!(signature = %signature, "challenge signed");
                state.signature = Some(signature.clone());
                state.recovered_address = None;
                state.is_verified = None;
                state.step = FlowStep::Signed;
                Ok(signature)
            }
            Err(e) => {
                let err = match e {
                    ProviderError::Unavailable => FlowError::ProviderUnavailable,
                    ProviderError::Rejected(m) => {
                        FlowError::SignRejected(message_or(m, SIGN_FALLBACK))
                    }
                    ProviderError::Failed(m) => {
                        FlowError::SignerError(message_or(m, SIGN_FALLBACK))
                    }
                };
                Err(Self::fail(state, err))
            }
        }
    }

    /// Recover the signer of the session's signature and compare it to the
    /// claimed address.
    ///
    /// Recovery goes through [`WalletProvider::recover_address`], which by
    /// default is a local computation with no wallet round-trip.
    ///
    /// Both a match and a mismatch move the session to `Verified`.
    pub fn verify(&self, state: &mut SessionState) -> Result<Verification, FlowError> {
        Self::ensure_not_busy(state)?;
        let (Some(signature), Some(address)) = (state.signature.clone(), state.address.clone())
        else {
            return Err(FlowError::NotSigned);
        };
        state.error = None;

        state.loading = Loading::Verifying;
        let message = state.challenge.as_str();
        let result = match &self.provider {
            Some(provider) => provider.recover_address(message, &signature),
            None => recover_address(message, &signature),
        }
        .map(|recovered| Verification::compare(recovered, &address));
        state.loading = Loading::Idle;

        match result {
            Ok(verification) => {
                tracing::info!(
                    recovered = %verification.recovered_address,
                    claimed = %address,
                    verified = verification.is_verified,
                    "signature checked"
                );
                state.apply_verification(&verification);
                Ok(verification)
            }
            Err(err) => Err(Self::fail(state, err)),
        }
    }

    /// Return the session to `Idle`, clearing every field at once.
    ///
    /// The challenge is kept or reissued according to [`ChallengePolicy`].
    pub fn reset(&self, state: &mut SessionState) {
        state.clear();
        if self.config.challenge_policy == ChallengePolicy::RegenerateOnReset {
            state.challenge = self.issue_challenge();
        }
        tracing::debug!(challenge = %state.challenge, "session reset");
    }
}
