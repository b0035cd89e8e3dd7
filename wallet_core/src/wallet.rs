//! In-process wallet that answers the flow's provider requests with a local key.

use std::path::Path;

use async_trait::async_trait;
use idproof_flow::{Accounts, ProviderError, WalletProvider};
use idproof_types::{KeyPair, NetworkId, PrivateKey, WalletAddress};

use crate::error::WalletError;
use crate::key_file::load_key_file;

/// Message returned when the simulated user declines account access.
pub const CONNECT_REJECTED: &str = "User rejected the request.";
/// Message returned when the simulated user declines to sign.
pub const SIGN_REJECTED: &str = "User denied message signature.";

/// Which requests the simulated user approves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Approval {
    pub connect: bool,
    pub sign: bool,
}

impl Default for Approval {
    fn default() -> Self {
        Self {
            connect: true,
            sign: true,
        }
    }
}

/// A wallet holding one secp256k1 key in memory.
pub struct LocalWallet {
    keys: KeyPair,
    address: WalletAddress,
    network: NetworkId,
    approval: Approval,
}

impl LocalWallet {
    /// Wallet for an existing private key.
    pub fn from_private_key(private: PrivateKey) -> Result<Self, WalletError> {
        let keys = idproof_crypto::keypair_from_private(private)
            .map_err(|e| WalletError::Key(e.to_string()))?;
        Ok(Self::from_keys(keys))
    }

    /// Wallet for the key stored in a hex key file.
    pub fn from_key_file(path: &Path) -> Result<Self, WalletError> {
        Self::from_private_key(load_key_file(path)?)
    }

    /// Wallet with a fresh random key that lives only as long as the process.
    pub fn ephemeral() -> Result<Self, WalletError> {
        let keys = idproof_crypto::generate_keypair().map_err(|e| WalletError::Key(e.to_string()))?;
        Ok(Self::from_keys(keys))
    }

    fn from_keys(keys: KeyPair) -> Self {
        let address = idproof_crypto::derive_address(&keys.public);
        Self {
            keys,
            address,
            network: NetworkId::mainnet(),
            approval: Approval::default(),
        }
    }

    /// Report `network` at connect time.
    pub fn with_network(mut self, network: NetworkId) -> Self {
        self.network = network;
        self
    }

    pub fn with_approval(mut self, approval: Approval) -> Self {
        self.approval = approval;
        self
    }

    /// The checksummed address this wallet controls.
    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    pub fn network(&self) -> &NetworkId {
        &self.network
    }

    /// Sign `message` directly, without going through the provider interface.
    pub fn sign(&self, message: &str) -> Result<String, WalletError> {
        idproof_crypto::sign_message(message.as_bytes(), &self.keys.private)
            .map(|sig| sig.to_hex())
            .map_err(|e| WalletError::Key(e.to_string()))
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    fn name(&self) -> &str {
        "local"
    }

    async fn request_accounts(&self) -> Result<Accounts, ProviderError> {
        if !self.approval.connect {
            tracing::debug!("account request declined");
            return Err(ProviderError::Rejected(CONNECT_REJECTED.into()));
        }
        Ok(Accounts {
            address: self.address.clone(),
            network: self.network.clone(),
        })
    }

    async fn sign_message(&self, message: &str) -> Result<String, ProviderError> {
        if !self.approval.sign {
            tracing::debug!("signature request declined");
            return Err(ProviderError::Rejected(SIGN_REJECTED.into()));
        }
        self.sign(message)
            .map_err(|e| ProviderError::Failed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_one() -> PrivateKey {
        let mut one = [0u8; 32];
        one[31] = 1;
        PrivateKey(one)
    }

    #[test]
    fn address_from_known_key() {
        let wallet = LocalWallet::from_private_key(scalar_one()).unwrap();
        assert_eq!(
            wallet.address().as_str(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn invalid_key_rejected() {
        assert!(matches!(
            LocalWallet::from_private_key(PrivateKey([0u8; 32])),
            Err(WalletError::Key(_))
        ));
    }

    #[test]
    fn key_file_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.key");
        crate::save_key_file(&scalar_one(), &path).unwrap();
        let wallet = LocalWallet::from_key_file(&path).unwrap();
        assert_eq!(
            wallet.address().as_str(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn missing_key_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let Err(err) = LocalWallet::from_key_file(&dir.path().join("gone.key")) else {
            panic!("expected key file error");
        };
        assert!(matches!(err, WalletError::KeyFile { .. }));
    }

    #[tokio::test]
    async fn provider_signature_recovers_to_wallet() {
        let wallet = LocalWallet::ephemeral().unwrap();
        let accounts = wallet.request_accounts().await.unwrap();
        let sig = wallet.sign_message("challenge").await.unwrap();
        let recovered = wallet.recover_address("challenge", &sig).unwrap();
        assert!(recovered.matches(&accounts.address));
    }

    #[tokio::test]
    async fn declined_requests() {
        let wallet = LocalWallet::ephemeral().unwrap().with_approval(Approval {
            connect: false,
            sign: false,
        });
        assert_eq!(
            wallet.request_accounts().await,
            Err(ProviderError::Rejected(CONNECT_REJECTED.into()))
        );
        assert_eq!(
            wallet.sign_message("x").await,
            Err(ProviderError::Rejected(SIGN_REJECTED.into()))
        );
    }

    #[tokio::test]
    async fn reports_configured_network() {
        let wallet = LocalWallet::ephemeral()
            .unwrap()
            .with_network(NetworkId::new("holesky", 17000));
        let accounts = wallet.request_accounts().await.unwrap();
        assert_eq!(accounts.network.to_string(), "holesky (17000)");
    }
}
