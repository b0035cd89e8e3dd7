//! Cryptographic primitives for the identity proof flow.
//!
//! - **secp256k1** ECDSA with recoverable signatures
//! - **Keccak-256** for message and public-key hashing
//! - **EIP-191** personal-message framing for anything a user signs
//! - Address derivation with EIP-55 mixed-case checksums
//!
//! Everything here is a pure function: no I/O, no network, no shared state.

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{derive_address, to_checksum_address};
pub use error::CryptoError;
pub use hash::{hash_message, keccak256};
pub use keys::{generate_keypair, keypair_from_private, public_from_private};
pub use sign::{recover_address, recover_public_key, sign_message, verify_message};
