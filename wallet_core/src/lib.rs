//! Wallet core library for the identity proof flow.
//!
//! Provides an in-process wallet a host can install as the flow's provider:
//! - Key generation and hex key files
//! - Address display (EIP-55 checksummed)
//! - Personal-message signing
//! - Simulated user approval, for demonstrating rejected requests

pub mod error;
pub mod key_file;
pub mod wallet;

pub use error::WalletError;
pub use key_file::{load_key_file, save_key_file};
pub use wallet::{Approval, LocalWallet, CONNECT_REJECTED, SIGN_REJECTED};
