//! Address derivation with EIP-55 checksum encoding.

use idproof_types::{PublicKey, WalletAddress};

use crate::hash::keccak256;

/// Render 20 address bytes as `0x` + 40 hex digits with the EIP-55 checksum.
///
/// Each letter digit is upper-cased when the matching nibble of
/// `keccak256(lowercase_hex)` is 8 or more.
pub fn to_checksum_address(bytes: &[u8; 20]) -> WalletAddress {
    let lower = WalletAddress::from_bytes(bytes);
    let hash = keccak256(&lower.as_str().as_bytes()[WalletAddress::PREFIX.len()..]);
    lower.with_case(|i| {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        nibble >= 8
    })
}

/// Derive the address controlled by a public key.
///
/// Address = last 20 bytes of `keccak256(x ‖ y)`.
pub fn derive_address(public_key: &PublicKey) -> WalletAddress {
    let hash = keccak256(public_key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    to_checksum_address(&bytes)
}
