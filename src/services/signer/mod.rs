//! Signing capability for Solana accounts.
use serde::Serialize;
use thiserror::Error;

mod solana;
pub use solana::*;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SignerError {
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),

    #[error("Invalid key format: {0}")]
    KeyError(String),

    #[error("Signer {signer} is not a required signer of the transaction")]
    NotRequiredSigner { signer: String },
}
