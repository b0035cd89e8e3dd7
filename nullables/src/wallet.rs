//! Nullable wallet: scripted provider responses with call recording.

use async_trait::async_trait;
use idproof_flow::{Accounts, ProviderError, WalletProvider};
use idproof_types::{KeyPair, NetworkId, PrivateKey, WalletAddress};
use std::collections::VecDeque;
use std::sync::Mutex;

/// How the next provider call should resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletOutcome {
    /// Answer normally: the configured account, or a real signature by the key.
    Approve,
    /// The user declines with this message.
    Reject(String),
    /// The wallet fails with this message.
    Fail(String),
    /// The wallet is gone.
    Unavailable,
    /// Return this exact signature hex instead of signing.
    Signature(String),
    /// Never resolve.
    Pending,
}

/// A call the flow made against the wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletCall {
    RequestAccounts,
    SignMessage(String),
}

/// A test wallet holding a real secp256k1 key.
///
/// Outcomes are consumed in order; once the script is exhausted every call
/// is approved.
pub struct NullWallet {
    keys: KeyPair,
    address: WalletAddress,
    network: NetworkId,
    script: Mutex<VecDeque<WalletOutcome>>,
    calls: Mutex<Vec<WalletCall>>,
}

impl NullWallet {
    /// Wallet for the key whose secret is `seed` (must be a valid scalar).
    ///
    /// # Panics
    /// Panics if `seed` is zero or not below the curve order.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let keys = idproof_crypto::keypair_from_private(PrivateKey(seed))
            .expect("NullWallet seed must be a valid secp256k1 scalar");
        let address = idproof_crypto::derive_address(&keys.public);
        Self {
            keys,
            address,
            network: NetworkId::mainnet(),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Wallet with a fixed, well-known key.
    pub fn new() -> Self {
        Self::from_seed([7u8; 32])
    }

    /// Report `address` at connect time instead of the key's own address.
    pub fn claiming(mut self, address: WalletAddress) -> Self {
        self.address = address;
        self
    }

    pub fn on_network(mut self, network: NetworkId) -> Self {
        self.network = network;
        self
    }

    /// Queue the outcome of the next unscripted call.
    pub fn script(&self, outcome: WalletOutcome) -> &Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    /// The address this wallet reports.
    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    /// The address the key actually controls.
    pub fn signer_address(&self) -> WalletAddress {
        idproof_crypto::derive_address(&self.keys.public)
    }

    /// All calls made so far (for assertions).
    pub fn calls(&self) -> Vec<WalletCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_outcome(&self, call: WalletCall) -> WalletOutcome {
        self.calls.lock().unwrap().push(call);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(WalletOutcome::Approve)
    }
}

impl Default for NullWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for NullWallet {
    fn name(&self) -> &str {
        "null-wallet"
    }

    async fn request_accounts(&self) -> Result<Accounts, ProviderError> {
        match self.next_outcome(WalletCall::RequestAccounts) {
            WalletOutcome::Approve | WalletOutcome::Signature(_) => Ok(Accounts {
                address: self.address.clone(),
                network: self.network.clone(),
            }),
            WalletOutcome::Reject(m) => Err(ProviderError::Rejected(m)),
            WalletOutcome::Fail(m) => Err(ProviderError::Failed(m)),
            WalletOutcome::Unavailable => Err(ProviderError::Unavailable),
            WalletOutcome::Pending => std::future::pending().await,
        }
    }

    async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        match self.next_outcome(WalletCall::SignMessage(message.to_string())) {
            WalletOutcome::Approve => {
                idproof_crypto::sign_message(message.as_bytes(), &self.keys.private)
                    .map(|sig| sig.to_hex())
                    .map_err(|e| ProviderError::Failed(e.to_string()))
            }
            WalletOutcome::Signature(hex) => Ok(hex),
            WalletOutcome::Reject(m) => Err(ProviderError::Rejected(m)),
            WalletOutcome::Fail(m) => Err(ProviderError::Failed(m)),
            WalletOutcome::Unavailable => Err(ProviderError::Unavailable),
            WalletOutcome::Pending => std::future::pending().await,
        }
    }
}
