use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};
use std::str::FromStr;
use strum::Display;

/// Status of a signature as reported by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolanaTransactionStatus {
    Processed,
    Confirmed,
    Finalized,
    Failed(String),
}

/// Confirmation level a caller chooses to wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FinalityTier {
    /// Voted on by a supermajority of the cluster.
    #[default]
    Confirmed,
    /// Rooted; irreversible.
    Finalized,
}

impl FinalityTier {
    /// Commitment used when reading state that must reflect this tier.
    pub fn commitment(&self) -> CommitmentConfig {
        match self {
            FinalityTier::Confirmed => CommitmentConfig::confirmed(),
            FinalityTier::Finalized => CommitmentConfig::finalized(),
        }
    }

    /// Whether an observed ledger status satisfies this tier.
    pub fn is_satisfied_by(&self, status: &SolanaTransactionStatus) -> bool {
        match (self, status) {
            (FinalityTier::Confirmed, SolanaTransactionStatus::Confirmed)
            | (FinalityTier::Confirmed, SolanaTransactionStatus::Finalized)
            | (FinalityTier::Finalized, SolanaTransactionStatus::Finalized) => true,
            _ => false,
        }
    }
}

impl FromStr for FinalityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "confirmed" => Ok(FinalityTier::Confirmed),
            "finalized" => Ok(FinalityTier::Finalized),
            other => Err(format!("unknown finality tier '{other}'")),
        }
    }
}

/// Client-side view of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Finalized,
    Failed,
    Expired,
}

impl ConfirmationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ConfirmationStatus::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ConfirmationStatus::Confirmed | ConfirmationStatus::Finalized
        )
    }
}

impl From<&SolanaTransactionStatus> for ConfirmationStatus {
    fn from(status: &SolanaTransactionStatus) -> Self {
        match status {
            SolanaTransactionStatus::Processed => ConfirmationStatus::Pending,
            SolanaTransactionStatus::Confirmed => ConfirmationStatus::Confirmed,
            SolanaTransactionStatus::Finalized => ConfirmationStatus::Finalized,
            SolanaTransactionStatus::Failed(_) => ConfirmationStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationReceipt {
    pub signature: Signature,
    pub status: ConfirmationStatus,
    /// Block height observed when the target tier was reached.
    pub block_height: Option<u64>,
    /// Number of status polls performed.
    pub polls: u32,
}
