//! Local signature verification.

use idproof_types::{Signature, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::error::{message_or, FlowError, VERIFY_FALLBACK};

/// Outcome of checking a signature against a claimed address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub recovered_address: WalletAddress,
    pub is_verified: bool,
}

impl Verification {
    /// Compare a recovered signer with the claimed address, ignoring case.
    pub fn compare(recovered_address: WalletAddress, claimed: &WalletAddress) -> Self {
        let is_verified = recovered_address.to_lowercase() == claimed.to_lowercase();
        Self {
            recovered_address,
            is_verified,
        }
    }
}

fn malformed(detail: String) -> FlowError {
    FlowError::MalformedSignature(message_or(detail, VERIFY_FALLBACK))
}

/// Recover the address that produced `signature_hex` over `message`.
pub fn recover_address(message: &str, signature_hex: &str) -> Result<WalletAddress, FlowError> {
    let signature = Signature::from_hex(signature_hex.trim()).map_err(|e| malformed(e.to_string()))?;
    idproof_crypto::recover_address(message.as_bytes(), &signature)
        .map_err(|e| malformed(e.to_string()))
}

/// Check that `signature_hex` over `message` was made by `claimed`.
///
/// A mismatch is a normal outcome (`is_verified == false`), not an error.
/// Only a malformed signature encoding fails.
pub fn verify(
    message: &str,
    signature_hex: &str,
    claimed: &WalletAddress,
) -> Result<Verification, FlowError> {
    let recovered_address = recover_address(message, signature_hex)?;
    Ok(Verification::compare(recovered_address, claimed))
}
