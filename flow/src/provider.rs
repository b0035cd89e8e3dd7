//! The wallet signer capability a host environment supplies.

use async_trait::async_trait;
use idproof_types::{NetworkId, WalletAddress};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FlowError;

/// What a wallet reports when the user grants account access.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accounts {
    pub address: WalletAddress,
    pub network: NetworkId,
}

/// Failure reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// No wallet is installed or reachable.
    #[error("wallet provider unavailable")]
    Unavailable,

    /// The user declined the request.
    #[error("{0}")]
    Rejected(String),

    /// Transport or signer fault.
    #[error("{0}")]
    Failed(String),
}

/// A wallet that can hand out an address and sign messages for it.
///
/// Implementations wrap whatever the host offers: an in-process key, a
/// hardware device, or a browser extension bridge. Calls may wait on the
/// user for an arbitrary time; the flow imposes no timeout.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Ask for account access.
    async fn request_accounts(&self) -> Result<Accounts, ProviderError>;

    /// Sign `message` as a personal message, returning the signature as hex.
    async fn sign_message(&self, message: &str) -> Result<String, ProviderError>;

    /// Recover the signer of `message` from `signature_hex`.
    ///
    /// Pure and local: no wallet round-trip is needed to check a signature.
    fn recover_address(
        &self,
        message: &str,
        signature_hex: &str,
    ) -> Result<WalletAddress, FlowError> {
        crate::verify::recover_address(message, signature_hex)
    }
}
