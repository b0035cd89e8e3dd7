//! Challenge-response identity proof.
//!
//! A session walks through three steps:
//! - **Connect**: ask a [`WalletProvider`] for the address the user claims
//! - **Sign**: have the provider sign the session's frozen challenge message
//! - **Verify**: recover the signer locally and compare it to the claimed address
//!
//! All session data lives in an explicit [`SessionState`] value that each
//! operation of [`IdentityProofFlow`] takes by `&mut`, so the flow can be driven
//! and inspected without any UI.

pub mod error;
pub mod flow;
pub mod provider;
pub mod state;
pub mod verify;

pub use error::FlowError;
pub use flow::{ChallengePolicy, FlowConfig, IdentityProofFlow};
pub use provider::{Accounts, ProviderError, WalletProvider};
pub use state::{FlowStep, Loading, SessionState};
pub use verify::{recover_address, verify, Verification};
