//! Point-in-time balance observations.

use chrono::{DateTime, Utc};
use solana_sdk::pubkey::Pubkey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub account: Pubkey,
    pub lamports: u64,
    /// Slot of the ledger state the balance was read from.
    pub slot: u64,
    pub taken_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    pub fn new(account: Pubkey, lamports: u64, slot: u64) -> Self {
        Self {
            account,
            lamports,
            slot,
            taken_at: Utc::now(),
        }
    }
}

/// Sender and receiver balances captured at the same stage of a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancePair {
    pub sender: BalanceSnapshot,
    pub receiver: BalanceSnapshot,
}
