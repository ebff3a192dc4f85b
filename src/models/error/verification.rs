use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// A post-transfer balance that does not fit the accounting model.
///
/// Every variant carries the observed values so a failed run can be diagnosed
/// from the error alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error(
        "Receiver balance mismatch: expected {expected} lamports ({before} + {amount}), found {actual}"
    )]
    ReceiverMismatch {
        before: u64,
        amount: u64,
        expected: u64,
        actual: u64,
    },

    #[error("Receiver balance {before} + {amount} overflows u64")]
    ReceiverOverflow { before: u64, amount: u64 },

    #[error("Sender balance did not decrease: before {before}, after {after}")]
    SenderNotDecreased { before: u64, after: u64 },

    #[error(
        "Sender balance {after} is below the lower bound {min_expected} (before {before}, amount {amount}, fee bound {fee_upper_bound})"
    )]
    SenderBelowLowerBound {
        before: u64,
        after: u64,
        amount: u64,
        fee_upper_bound: u64,
        min_expected: u64,
    },

    #[error("Snapshots refer to different accounts for {role}: before {before}, after {after}")]
    SnapshotAccountMismatch {
        role: &'static str,
        before: Pubkey,
        after: Pubkey,
    },
}
