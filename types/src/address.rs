//! Hex-encoded wallet address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;

/// A 20-byte account address rendered as `0x` followed by 40 hex digits.
///
/// The letter case of the digits carries no meaning beyond an optional
/// checksum, so two addresses are the same account when they are equal
/// ignoring ASCII case. Use [`WalletAddress::matches`] for that comparison;
/// the derived `PartialEq` compares the exact string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// The standard prefix for all addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of hex digits after the prefix.
    pub const HEX_LEN: usize = 40;

    /// Parse an address string, keeping its letter case as given.
    ///
    /// The `0x` prefix is required; digits may be in any case.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let Some(digits) = s.strip_prefix(Self::PREFIX) else {
            return Err(TypesError::InvalidAddress(format!("missing 0x prefix: {s}")));
        };
        if digits.len() != Self::HEX_LEN {
            return Err(TypesError::InvalidAddress(format!(
                "expected {} hex digits, got {}",
                Self::HEX_LEN,
                digits.len()
            )));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidAddress(format!("non-hex digit in {s}")));
        }
        Ok(Self(s))
    }

    /// Lower-case address for 20 raw bytes.
    pub fn from_bytes(bytes: &[u8; 20]) -> Self {
        Self(format!("{}{}", Self::PREFIX, hex::encode(bytes)))
    }

    /// Re-case the hex digits: digit `i` (0-based after the prefix) is
    /// upper-cased when `upper(i)` holds and lower-cased otherwise.
    ///
    /// Case never affects validity, so the result is always a valid address.
    pub fn with_case(&self, upper: impl Fn(usize) -> bool) -> Self {
        let digits = self.0[Self::PREFIX.len()..].chars().enumerate().map(|(i, c)| {
            if upper(i) {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        });
        Self(Self::PREFIX.chars().chain(digits).collect())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The address bytes.
    pub fn to_bytes(&self) -> [u8; 20] {
        let mut out = [0u8; 20];
        // Every constructor yields exactly 40 hex digits after the prefix.
        if let Ok(decoded) = hex::decode(&self.0[Self::PREFIX.len()..]) {
            out.copy_from_slice(&decoded);
        }
        out
    }

    /// Lower-case rendering, the canonical form for comparison.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Whether `self` and `other` name the same account (case-insensitive).
    pub fn matches(&self, other: &WalletAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Shortened form for display, e.g. `0xAbCd…1234`.
    pub fn abbreviated(&self) -> String {
        format!("{}…{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn parse_accepts_mixed_case() {
        let addr = WalletAddress::parse(ADDR).unwrap();
        assert_eq!(addr.as_str(), ADDR);
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        let err = WalletAddress::parse(&ADDR[2..]).unwrap_err();
        assert!(matches!(err, TypesError::InvalidAddress(_)));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!(WalletAddress::parse("0x1234").is_err());
        assert!(WalletAddress::parse(format!("{ADDR}00")).is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(WalletAddress::parse("0xZZAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_err());
    }

    #[test]
    fn matches_ignores_case() {
        let a = WalletAddress::parse(ADDR).unwrap();
        let b = WalletAddress::parse(ADDR.to_lowercase()).unwrap();
        let c = WalletAddress::parse(ADDR.to_uppercase().replacen("0X", "0x", 1)).unwrap();
        assert!(a.matches(&b));
        assert!(b.matches(&c));
        assert_ne!(a, b);
    }

    #[test]
    fn to_bytes_decodes_digits() {
        let addr = WalletAddress::parse("0x00000000000000000000000000000000000000ff").unwrap();
        let bytes = addr.to_bytes();
        assert_eq!(bytes[19], 0xff);
        assert!(bytes[..19].iter().all(|b| *b == 0));
    }

    #[test]
    fn abbreviated_keeps_ends() {
        let addr = WalletAddress::parse(ADDR).unwrap();
        assert_eq!(addr.abbreviated(), "0x5aAe…eAed");
    }

    #[test]
    fn from_bytes_is_valid_lowercase() {
        let mut bytes = [0u8; 20];
        bytes[0] = 0xab;
        bytes[19] = 0x01;
        let addr = WalletAddress::from_bytes(&bytes);
        assert_eq!(addr.as_str(), "0xab00000000000000000000000000000000000001");
        assert_eq!(WalletAddress::parse(addr.as_str()).unwrap(), addr);
        assert_eq!(addr.to_bytes(), bytes);
        assert_eq!(addr.abbreviated(), "0xab00…0001");
    }

    #[test]
    fn with_case_only_changes_letters() {
        let lower = WalletAddress::parse(ADDR.to_lowercase()).unwrap();
        let upper = lower.with_case(|_| true);
        assert_eq!(upper.as_str(), format!("0x{}", ADDR[2..].to_uppercase()));
        assert!(upper.matches(&lower));
        assert!(WalletAddress::parse(upper.as_str()).is_ok());

        let checksummed = lower.with_case(|i| ADDR.as_bytes()[i + 2].is_ascii_uppercase());
        assert_eq!(checksummed.as_str(), ADDR);
    }

    #[test]
    fn serde_rejects_invalid() {
        let ok: WalletAddress = serde_json::from_str(&format!("\"{ADDR}\"")).unwrap();
        assert_eq!(ok.as_str(), ADDR);
        assert!(serde_json::from_str::<WalletAddress>("\"0xnothex\"").is_err());
    }
}
