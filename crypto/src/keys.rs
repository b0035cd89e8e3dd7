//! secp256k1 key generation.

use idproof_types::{KeyPair, PrivateKey, PublicKey};
use k256::ecdsa::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Attempts before giving up on drawing a valid scalar. A uniformly random
/// 32-byte string is out of range with probability about 2^-128.
const MAX_DRAWS: usize = 8;

/// Generate a new key pair from the operating system's entropy source.
pub fn generate_keypair() -> Result<KeyPair, CryptoError> {
    let mut seed = [0u8; 32];
    for _ in 0..MAX_DRAWS {
        getrandom::getrandom(&mut seed).map_err(|e| CryptoError::Entropy(e.to_string()))?;
        if let Ok(kp) = keypair_from_private(PrivateKey(seed)) {
            seed.zeroize();
            return Ok(kp);
        }
    }
    seed.zeroize();
    Err(CryptoError::Entropy(
        "could not draw a valid secp256k1 scalar".into(),
    ))
}

/// Parse the secret scalar, rejecting zero and values at or above the curve order.
pub(crate) fn signing_key(private: &PrivateKey) -> Result<SigningKey, CryptoError> {
    SigningKey::from_slice(&private.0)
        .map_err(|_| CryptoError::InvalidPrivateKey("scalar out of range".into()))
}

/// Uncompressed `x ‖ y` coordinates of a verifying key.
pub(crate) fn public_from_verifying(key: &VerifyingKey) -> PublicKey {
    let point = key.to_encoded_point(false);
    let mut out = [0u8; 64];
    // Skip the 0x04 SEC1 tag.
    out.copy_from_slice(&point.as_bytes()[1..]);
    PublicKey(out)
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> Result<PublicKey, CryptoError> {
    let key = signing_key(private)?;
    Ok(public_from_verifying(key.verifying_key()))
}

/// Reconstruct a full key pair from a private key.
pub fn keypair_from_private(private: PrivateKey) -> Result<KeyPair, CryptoError> {
    let public = public_from_private(&private)?;
    Ok(KeyPair { public, private })
}
