//! Fundamental types for the identity proof flow.
//!
//! This crate defines the values shared across every other crate in the workspace:
//! wallet addresses, keys and signatures, network identifiers, timestamps and
//! the challenge message a user signs.

pub mod address;
pub mod challenge;
pub mod error;
pub mod keys;
pub mod network;
pub mod time;

pub use address::WalletAddress;
pub use challenge::{ChallengeMessage, DEFAULT_CHALLENGE_PREFIX};
pub use error::TypesError;
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::NetworkId;
pub use time::Timestamp;
