//! Errors surfaced by flow operations.
//!
//! Every variant aborts only the step that raised it. The `Display` text of the
//! external-failure variants is the provider's own message, shown verbatim.

use thiserror::Error;

use crate::state::Loading;

pub(crate) const CONNECT_FALLBACK: &str = "Failed to connect wallet";
pub(crate) const SIGN_FALLBACK: &str = "Failed to sign message";
pub(crate) const VERIFY_FALLBACK: &str = "Failed to verify signature";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("No wallet provider found. Please install a wallet.")]
    ProviderUnavailable,

    #[error("{0}")]
    UserRejected(String),

    #[error("{0}")]
    ProviderError(String),

    #[error("{0}")]
    SignRejected(String),

    #[error("{0}")]
    SignerError(String),

    #[error("{0}")]
    MalformedSignature(String),

    #[error("connect a wallet before signing")]
    NotConnected,

    #[error("sign the challenge before verifying")]
    NotSigned,

    #[error("a wallet is already connected; reset to start over")]
    AlreadyConnected,

    #[error("{} in progress", .0.label())]
    Busy(Loading),
}

impl FlowError {
    /// Whether the error came from a precondition check rather than a step that ran.
    ///
    /// Guard errors are returned to the caller but never shown in the error overlay.
    pub fn is_guard(&self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::NotSigned | Self::AlreadyConnected | Self::Busy(_)
        )
    }
}

/// Use `fallback` when an external party reported an empty message.
pub(crate) fn message_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
