use solana_sdk::{pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use super::VerificationFailure;
use crate::services::{SignerError, SolanaProviderError};

/// Errors raised while moving a transfer through its build, assemble, sign,
/// submit, confirm, and verify stages.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Transaction must contain at least one instruction")]
    EmptyTransaction,

    #[error("Account {0} has no signing capability")]
    MissingSigningCapability(Pubkey),

    #[error("Account {0} is not a required signer of the transaction")]
    SignerNotRequired(Pubkey),

    #[error("Signing failed: {0}")]
    SigningFailed(#[from] SignerError),

    #[error("Transaction is missing valid signatures for: {}", format_pubkeys(.missing))]
    IncompleteSignatures { missing: Vec<Pubkey> },

    #[error("Failed to serialize transaction: {0}")]
    Serialization(String),

    #[error("Network error while submitting transaction: {0}")]
    SubmissionNetworkError(SolanaProviderError),

    #[error("Ledger rejected transaction: {0}")]
    SubmissionRejected(SolanaProviderError),

    #[error(
        "Transaction {signature} expired: block height {} exceeded last valid block height {last_valid_block_height}",
        format_height(.block_height)
    )]
    ConfirmationExpired {
        signature: Signature,
        last_valid_block_height: u64,
        block_height: Option<u64>,
    },

    #[error("Transaction {signature} failed on-chain: {reason}")]
    ConfirmationFailed { signature: Signature, reason: String },

    #[error("Balance verification failed: {0}")]
    Verification(#[from] VerificationFailure),

    #[error("Ledger provider error: {0}")]
    Provider(#[from] SolanaProviderError),
}

impl TransferError {
    /// Whether the ledger refused the transfer because an account could not
    /// cover the amount or the fee.
    pub fn is_insufficient_funds(&self) -> bool {
        match self {
            TransferError::SubmissionRejected(err) | TransferError::Provider(err) => {
                matches!(err, SolanaProviderError::InsufficientFunds(_))
            }
            TransferError::ConfirmationFailed { reason, .. } => {
                reason.to_lowercase().contains("insufficient")
            }
            _ => false,
        }
    }
}

fn format_pubkeys(keys: &[Pubkey]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_height(height: &Option<u64>) -> String {
    match height {
        Some(h) => h.to_string(),
        None => "unknown".to_string(),
    }
}
