//! Wraps instructions in a transaction envelope with an explicit fee payer and
//! a freshness token.

use solana_sdk::{
    instruction::Instruction, message::Message, pubkey::Pubkey,
    transaction::Transaction as SolanaTransaction,
};
use tracing::debug;

use crate::models::{Account, AssembledTransaction, FreshnessToken, TransferError};

/// Signer accounts of the instructions, in first appearance order.
fn collect_value_senders(instructions: &[Instruction]) -> Vec<Pubkey> {
    let mut senders: Vec<Pubkey> = Vec::new();
    for meta in instructions.iter().flat_map(|ix| ix.accounts.iter()) {
        if meta.is_signer && !senders.contains(&meta.pubkey) {
            senders.push(meta.pubkey);
        }
    }
    senders
}

/// Compiles `instructions` into an unsigned transaction paid for by `fee_payer`
/// and bound to `freshness`.
pub fn assemble(
    instructions: &[Instruction],
    fee_payer: &Account,
    freshness: FreshnessToken,
) -> Result<AssembledTransaction, TransferError> {
    if instructions.is_empty() {
        return Err(TransferError::EmptyTransaction);
    }

    let payer = fee_payer.address();
    let message = Message::new_with_blockhash(instructions, Some(&payer), &freshness.blockhash);
    let transaction = SolanaTransaction::new_unsigned(message);
    let value_senders = collect_value_senders(instructions);

    debug!(
        fee_payer = %payer,
        instructions = instructions.len(),
        required_signatures = transaction.message.header.num_required_signatures,
        last_valid_block_height = freshness.last_valid_block_height,
        "assembled transaction"
    );

    Ok(AssembledTransaction::new(
        transaction,
        payer,
        value_senders,
        freshness,
    ))
}
