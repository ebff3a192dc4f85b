//! Assembled transactions and their confirmation lifecycle.

mod status;
pub use status::*;

use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction as SolanaTransaction,
};

use super::TransferError;

/// Short-lived, network-issued value bounding how long a transaction may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessToken {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

impl FreshnessToken {
    pub fn new(blockhash: Hash, last_valid_block_height: u64) -> Self {
        Self {
            blockhash,
            last_valid_block_height,
        }
    }

    /// Whether a transaction bound to this token can still land at `block_height`.
    pub fn is_valid_at(&self, block_height: u64) -> bool {
        block_height <= self.last_valid_block_height
    }
}

/// A transaction envelope: compiled instructions, an explicit fee payer, the
/// value senders, and a freshness token.
///
/// Fee payer and value senders are kept as separate fields even when they
/// hold the same address.
#[derive(Debug, Clone)]
pub struct AssembledTransaction {
    pub(crate) transaction: SolanaTransaction,
    fee_payer: Pubkey,
    value_senders: Vec<Pubkey>,
    freshness: FreshnessToken,
}

impl AssembledTransaction {
    pub(crate) fn new(
        transaction: SolanaTransaction,
        fee_payer: Pubkey,
        value_senders: Vec<Pubkey>,
        freshness: FreshnessToken,
    ) -> Self {
        Self {
            transaction,
            fee_payer,
            value_senders,
            freshness,
        }
    }

    pub fn fee_payer(&self) -> Pubkey {
        self.fee_payer
    }

    pub fn value_senders(&self) -> &[Pubkey] {
        &self.value_senders
    }

    pub fn freshness(&self) -> &FreshnessToken {
        &self.freshness
    }

    pub fn transaction(&self) -> &SolanaTransaction {
        &self.transaction
    }

    /// Accounts whose signatures the ledger requires, fee payer first.
    pub fn required_signers(&self) -> &[Pubkey] {
        let required = self.transaction.message.header.num_required_signatures as usize;
        let keys = &self.transaction.message.account_keys;
        &keys[..required.min(keys.len())]
    }

    /// Required signers without a valid signature over the current message.
    pub fn missing_signatures(&self) -> Vec<Pubkey> {
        let message_data = self.transaction.message_data();
        self.required_signers()
            .iter()
            .enumerate()
            .filter(|(index, pubkey)| {
                match self.transaction.signatures.get(*index) {
                    Some(signature) if *signature != Signature::default() => {
                        !signature.verify(pubkey.as_ref(), &message_data)
                    }
                    _ => true,
                }
            })
            .map(|(_, pubkey)| *pubkey)
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.missing_signatures().is_empty()
    }

    /// The transaction id: the fee payer's signature.
    pub fn signature(&self) -> Option<Signature> {
        self.transaction
            .signatures
            .first()
            .filter(|signature| **signature != Signature::default())
            .copied()
    }

    /// Canonical wire encoding. Fails with `IncompleteSignatures` unless every
    /// required signer has signed.
    pub fn wire_bytes(&self) -> Result<Vec<u8>, TransferError> {
        let missing = self.missing_signatures();
        if !missing.is_empty() {
            return Err(TransferError::IncompleteSignatures { missing });
        }
        bincode::serialize(&self.transaction)
            .map_err(|e| TransferError::Serialization(e.to_string()))
    }
}
