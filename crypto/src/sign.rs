//! Recoverable ECDSA signing and public-key recovery over EIP-191 messages.

use idproof_types::{PrivateKey, PublicKey, Signature, WalletAddress};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use k256::elliptic_curve::scalar::IsHigh;

use crate::address::derive_address;
use crate::error::CryptoError;
use crate::hash::hash_message;
use crate::keys::{public_from_verifying, signing_key};

/// Offset wallets add to the recovery id in the `v` byte.
const V_OFFSET: u8 = 27;

/// Sign a message with a private key, returning a 65-byte `r ‖ s ‖ v` signature.
///
/// The message is framed and hashed with [`hash_message`] first. Signatures are
/// deterministic (RFC 6979), always use the low-s form, and carry `v ∈ {27, 28}`.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let key = signing_key(private_key)?;
    let prehash = hash_message(message);
    let (mut sig, mut recid) = key
        .sign_prehash_recoverable(&prehash)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;

    if let Some(normalized) = sig.normalize_s() {
        sig = normalized;
        recid = RecoveryId::new(!recid.is_y_odd(), recid.is_x_reduced());
    }

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&sig.to_bytes());
    out[64] = recid.to_byte() + V_OFFSET;
    Ok(Signature(out))
}

/// Map the transmitted `v` byte to a recovery id. Accepts `0`/`1` and `27`/`28`.
fn recovery_id(v: u8) -> Result<RecoveryId, CryptoError> {
    let raw = match v {
        0 | 1 => v,
        27 | 28 => v - V_OFFSET,
        other => {
            return Err(CryptoError::MalformedSignature(format!(
                "invalid recovery byte {other}"
            )))
        }
    };
    match RecoveryId::from_byte(raw) {
        Some(recid) if !recid.is_x_reduced() => Ok(recid),
        _ => Err(CryptoError::MalformedSignature(format!(
            "invalid recovery byte {v}"
        ))),
    }
}

/// Recover the public key that produced `signature` over `message`.
///
/// Fails only when the signature encoding is malformed: `r` or `s` out of
/// range, a high `s`, or an unknown recovery byte. A well-formed signature
/// checked against the wrong message recovers some other key rather than failing.
pub fn recover_public_key(
    message: &[u8],
    signature: &Signature,
) -> Result<PublicKey, CryptoError> {
    let recid = recovery_id(signature.v())?;
    let sig = EcdsaSignature::try_from(&signature.as_bytes()[..64])
        .map_err(|_| CryptoError::MalformedSignature("r or s out of range".into()))?;

    // Only the canonical low-s form is accepted.
    if sig.s().is_high().into() {
        return Err(CryptoError::MalformedSignature("signature s is high".into()));
    }

    let prehash = hash_message(message);
    let key = VerifyingKey::recover_from_prehash(&prehash, &sig, recid)
        .map_err(|e| CryptoError::MalformedSignature(format!("recovery failed: {e}")))?;
    Ok(public_from_verifying(&key))
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_address(
    message: &[u8],
    signature: &Signature,
) -> Result<WalletAddress, CryptoError> {
    recover_public_key(message, signature).map(|pk| derive_address(&pk))
}

/// Whether `signature` over `message` was produced by `expected` (case-insensitive).
pub fn verify_message(
    message: &[u8],
    signature: &Signature,
    expected: &WalletAddress,
) -> Result<bool, CryptoError> {
    Ok(recover_address(message, signature)?.matches(expected))
}
