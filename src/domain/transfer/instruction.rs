//! Builds the on-chain instruction that moves lamports between two accounts.

use sha2::{Digest, Sha256};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_system_interface::{instruction as system_instruction, program as system_program};

use crate::{
    constants::TRANSFER_SOL_DISCRIMINATOR_PREIMAGE,
    models::{TransferError, TransferIntent, TransferProgram},
};

/// First 8 bytes of `sha256("global:transfer_sol")`, the Anchor method selector.
pub fn transfer_sol_discriminator() -> [u8; 8] {
    let digest = Sha256::digest(TRANSFER_SOL_DISCRIMINATOR_PREIMAGE.as_bytes());
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

/// Encodes `transfer_sol(amount)`: discriminator followed by `amount` as u64 LE.
fn encode_transfer_sol(amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&transfer_sol_discriminator());
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

/// Turns a transfer intent into an unsigned instruction for `program`.
///
/// Account order for the Anchor program: sender (writable, signer), receiver
/// (writable), system program (read-only). Sender and receiver may be the
/// same account.
pub fn build_transfer_instruction(
    intent: &TransferIntent,
    program: &TransferProgram,
) -> Result<Instruction, TransferError> {
    if intent.amount() == 0 {
        return Err(TransferError::InvalidAmount(
            "transfer amount must be greater than zero lamports".to_string(),
        ));
    }
    let sender = intent.sender().address();
    let receiver = intent.receiver().address();

    let instruction = match program {
        TransferProgram::System => {
            system_instruction::transfer(&sender, &receiver, intent.amount())
        }
        TransferProgram::Anchor { program_id } => Instruction {
            program_id: *program_id,
            accounts: vec![
                AccountMeta::new(sender, true),
                AccountMeta::new(receiver, false),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: encode_transfer_sol(intent.amount()),
        },
    };
    Ok(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use solana_sdk::pubkey::Pubkey;

    #[test]
    fn test_discriminator_matches_anchor_layout() {
        assert_eq!(
            transfer_sol_discriminator(),
            [78, 10, 236, 247, 109, 117, 21, 76]
        );
    }

    #[test]
    fn test_anchor_instruction_layout() {
        let sender = Account::generate();
        let receiver = Account::generate();
        let program_id = Pubkey::new_unique();
        let intent = TransferIntent::new(sender.clone(), receiver.clone(), 2_000_000_000).unwrap();

        let ix = build_transfer_instruction(&intent, &TransferProgram::Anchor { program_id })
            .unwrap();

        assert_eq!(ix.program_id, program_id);
        assert_eq!(
            ix.accounts,
            vec![
                AccountMeta::new(sender.address(), true),
                AccountMeta::new(receiver.address(), false),
                AccountMeta::new_readonly(system_program::ID, false),
            ]
        );
        assert_eq!(ix.data.len(), 16);
        assert_eq!(&ix.data[..8], &transfer_sol_discriminator());
        assert_eq!(&ix.data[8..], &2_000_000_000u64.to_le_bytes());
    }

    #[test]
    fn test_system_instruction_layout() {
        let sender = Account::generate();
        let receiver = Account::generate();
        let intent = TransferIntent::new(sender.clone(), receiver.clone(), 42).unwrap();

        let ix = build_transfer_instruction(&intent, &TransferProgram::System).unwrap();

        assert_eq!(ix.program_id, system_program::ID);
        assert_eq!(ix.accounts.len(), 2);
        assert!(ix.accounts[0].is_signer && ix.accounts[0].is_writable);
        assert!(!ix.accounts[1].is_signer && ix.accounts[1].is_writable);
        assert_eq!(&ix.data[..4], &2u32.to_le_bytes());
        assert_eq!(&ix.data[4..], &42u64.to_le_bytes());
    }

    #[test]
    fn test_self_transfer_is_allowed() {
        let account = Account::generate();
        let intent = TransferIntent::new(account.clone(), account.clone(), 1).unwrap();

        let ix = build_transfer_instruction(&intent, &TransferProgram::default()).unwrap();
        assert_eq!(ix.accounts[0].pubkey, ix.accounts[1].pubkey);
    }

    #[test]
    fn test_building_is_pure() {
        let intent = TransferIntent::new(Account::generate(), Account::generate(), 7).unwrap();
        let program = TransferProgram::default();

        assert_eq!(
            build_transfer_instruction(&intent, &program).unwrap(),
            build_transfer_instruction(&intent, &program).unwrap()
        );
    }
}
