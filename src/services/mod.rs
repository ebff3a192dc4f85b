//! External-facing services: ledger providers and signers.
mod provider;
pub use provider::*;

mod signer;
pub use signer::*;
