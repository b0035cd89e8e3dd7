//! Keccak-256 hashing and EIP-191 personal-message framing.

use sha3::{Digest, Keccak256};

/// Prefix prepended to every personal message before hashing (EIP-191, version `0x45`).
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Compute the 256-bit Keccak hash of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash a message the way wallets do before signing it.
///
/// `keccak256("\x19Ethereum Signed Message:\n" ‖ len(message) ‖ message)`, where the
/// length is the decimal byte count of the UTF-8 message.
pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}
