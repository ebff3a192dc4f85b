//! Transfer intent and the program that carries it out.

use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use super::{Account, TransferError};
use crate::{constants::DEFAULT_TRANSFER_PROGRAM_ID, utils::parse_sol_to_lamports};

/// "Move `amount` lamports from `sender` to `receiver`".
///
/// The amount is always non-zero: zero-lamport transfers are rejected with
/// `TransferError::InvalidAmount` when the intent is created.
#[derive(Debug, Clone)]
pub struct TransferIntent {
    sender: Account,
    receiver: Account,
    amount: u64,
}

impl TransferIntent {
    pub fn new(sender: Account, receiver: Account, amount: u64) -> Result<Self, TransferError> {
        if amount == 0 {
            return Err(TransferError::InvalidAmount(
                "transfer amount must be greater than zero lamports".to_string(),
            ));
        }
        Ok(Self {
            sender,
            receiver,
            amount,
        })
    }

    /// Builds an intent from a decimal SOL amount such as `"2"` or `"0.5"`.
    pub fn from_sol_str(
        sender: Account,
        receiver: Account,
        sol: &str,
    ) -> Result<Self, TransferError> {
        let lamports = parse_sol_to_lamports(sol)?;
        Self::new(sender, receiver, lamports)
    }

    pub fn sender(&self) -> &Account {
        &self.sender
    }

    pub fn receiver(&self) -> &Account {
        &self.receiver
    }

    /// Amount in lamports.
    pub fn amount(&self) -> u64 {
        self.amount
    }
}

/// On-chain program used to move the lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferProgram {
    /// The native system program transfer.
    System,
    /// An Anchor program exposing `transfer_sol(amount: u64)`, which performs
    /// a CPI into the system program.
    Anchor { program_id: Pubkey },
}

impl TransferProgram {
    pub fn program_id(&self) -> Pubkey {
        match self {
            TransferProgram::System => solana_system_interface::program::ID,
            TransferProgram::Anchor { program_id } => *program_id,
        }
    }
}

impl Default for TransferProgram {
    fn default() -> Self {
        // The constant is a valid base58 pubkey.
        let program_id = Pubkey::from_str(DEFAULT_TRANSFER_PROGRAM_ID).unwrap_or_default();
        TransferProgram::Anchor { program_id }
    }
}
