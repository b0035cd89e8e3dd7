//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of the flow (clock, wallet provider) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem, network, or a real wallet
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod wallet;

pub use clock::NullClock;
pub use wallet::{NullWallet, WalletCall, WalletOutcome};
