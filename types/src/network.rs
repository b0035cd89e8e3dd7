//! Network identifier reported by a wallet at connect time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which chain a connected wallet is pointed at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkId {
    /// Human-readable name, e.g. `"mainnet"`.
    pub name: String,
    /// Numeric chain identifier.
    pub chain_id: u64,
}

impl NetworkId {
    pub fn new(name: impl Into<String>, chain_id: u64) -> Self {
        Self {
            name: name.into(),
            chain_id,
        }
    }

    /// The main public network.
    pub fn mainnet() -> Self {
        Self::new("mainnet", 1)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}
