//! In-memory ledger implementing `SolanaProviderTrait`.
//!
//! Executes system-program transfers and the Anchor `transfer_sol` instruction
//! atomically against a `HashMap` of balances, charges a flat fee per required
//! signature, and issues blockhashes that expire after
//! `BLOCKHASH_VALIDITY_BLOCKS`. Every signature status query advances the
//! ledger by one block, so confirmation and expiry are reached
//! deterministically without a real cluster.

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::{hashv, Hash},
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_system_interface::program as system_program;
use std::collections::HashMap;
use tracing::debug;

use super::{SolanaProviderError, SolanaProviderTrait};
use crate::{
    constants::{BLOCKHASH_VALIDITY_BLOCKS, DEFAULT_LAMPORTS_PER_SIGNATURE},
    domain::transfer_sol_discriminator,
    models::{SolanaTransactionStatus, TransferProgram},
};

/// Blocks after landing before a transaction counts as confirmed.
const CONFIRMATION_DEPTH: u64 = 1;

/// Blocks after landing before a transaction counts as finalized.
const FINALIZATION_DEPTH: u64 = 32;

/// System program instruction index of `Transfer`.
const SYSTEM_TRANSFER_TAG: u32 = 2;

#[derive(Debug, Clone)]
struct LandedTransaction {
    block_height: u64,
    error: Option<String>,
}

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Pubkey, u64>,
    block_height: u64,
    blockhashes: HashMap<Hash, u64>,
    landed: HashMap<Signature, LandedTransaction>,
    issued: u64,
    drop_next: usize,
}

/// Failure while executing the instructions of an accepted transaction.
#[derive(Debug)]
enum ExecutionError {
    InsufficientLamports { account: Pubkey, have: u64, need: u64 },
    Invalid(String),
}

impl ExecutionError {
    fn message(&self) -> String {
        match self {
            ExecutionError::InsufficientLamports {
                account,
                have,
                need,
            } => format!("Transfer: insufficient lamports {have}, need {need} ({account})"),
            ExecutionError::Invalid(msg) => msg.clone(),
        }
    }

    fn into_provider_error(self) -> SolanaProviderError {
        match &self {
            ExecutionError::InsufficientLamports { .. } => {
                SolanaProviderError::InsufficientFunds(self.message())
            }
            ExecutionError::Invalid(_) => SolanaProviderError::InvalidTransaction(self.message()),
        }
    }
}

#[derive(Debug)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
    faucet: Keypair,
    transfer_program: Pubkey,
    lamports_per_signature: u64,
    skip_preflight: bool,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState {
                block_height: 1,
                ..Default::default()
            }),
            faucet: Keypair::new(),
            transfer_program: TransferProgram::default().program_id(),
            lamports_per_signature: DEFAULT_LAMPORTS_PER_SIGNATURE,
            skip_preflight: false,
        }
    }

    /// Program id accepted for the Anchor `transfer_sol` instruction.
    pub fn with_transfer_program(mut self, program_id: Pubkey) -> Self {
        self.transfer_program = program_id;
        self
    }

    pub fn with_lamports_per_signature(mut self, lamports: u64) -> Self {
        self.lamports_per_signature = lamports;
        self
    }

    /// When set, transactions whose instructions fail still land: the fee is
    /// charged and the signature reports a failure. Otherwise they are
    /// rejected at submission with no state change.
    pub fn with_skip_preflight(mut self, skip: bool) -> Self {
        self.skip_preflight = skip;
        self
    }

    pub fn set_balance(&self, pubkey: &Pubkey, lamports: u64) {
        self.state.lock().balances.insert(*pubkey, lamports);
    }

    pub fn balance(&self, pubkey: &Pubkey) -> u64 {
        self.state.lock().balances.get(pubkey).copied().unwrap_or(0)
    }

    pub fn block_height(&self) -> u64 {
        self.state.lock().block_height
    }

    pub fn advance_blocks(&self, blocks: u64) {
        let mut state = self.state.lock();
        state.block_height = state.block_height.saturating_add(blocks);
    }

    /// Accepts the next `count` submissions without ever landing them, as a
    /// leader that drops the packet would.
    pub fn drop_next_submissions(&self, count: usize) {
        self.state.lock().drop_next = count;
    }

    /// Number of signatures that landed (including airdrops and failed transactions).
    pub fn landed_count(&self) -> usize {
        self.state.lock().landed.len()
    }

    fn next_blockhash(state: &mut LedgerState) -> Hash {
        state.issued += 1;
        hashv(&[b"in-memory-ledger", &state.issued.to_le_bytes()])
    }

    fn verify_signatures(tx: &Transaction) -> bool {
        let required = tx.message.header.num_required_signatures as usize;
        if tx.signatures.len() != required || tx.message.account_keys.len() < required {
            return false;
        }
        let message_data = tx.message_data();
        tx.signatures
            .iter()
            .zip(tx.message.account_keys.iter())
            .all(|(signature, pubkey)| signature.verify(pubkey.as_ref(), &message_data))
    }

    /// Decodes a transfer from one compiled instruction: (from, to, lamports).
    fn decode_transfer(
        &self,
        message: &Message,
        index: usize,
    ) -> Result<(usize, usize, u64), ExecutionError> {
        let instruction = &message.instructions[index];
        let program_id = message
            .account_keys
            .get(instruction.program_id_index as usize)
            .ok_or_else(|| {
                ExecutionError::Invalid(format!("Instruction {index}: program index out of range"))
            })?;
        let data = &instruction.data;
        let accounts = &instruction.accounts;

        let lamports = if *program_id == system_program::ID {
            if data.len() != 12 || data[..4] != SYSTEM_TRANSFER_TAG.to_le_bytes() {
                return Err(ExecutionError::Invalid(format!(
                    "Instruction {index}: unsupported system instruction"
                )));
            }
            u64::from_le_bytes(data[4..12].try_into().unwrap_or_default())
        } else if *program_id == self.transfer_program {
            if data.len() != 16 || data[..8] != transfer_sol_discriminator() {
                return Err(ExecutionError::Invalid(format!(
                    "Instruction {index}: unknown instruction for program {program_id}"
                )));
            }
            let system_account = accounts
                .get(2)
                .and_then(|i| message.account_keys.get(*i as usize));
            if system_account != Some(&system_program::ID) {
                return Err(ExecutionError::Invalid(format!(
                    "Instruction {index}: system program account missing"
                )));
            }
            u64::from_le_bytes(data[8..16].try_into().unwrap_or_default())
        } else {
            return Err(ExecutionError::Invalid(format!(
                "Instruction {index}: unsupported program {program_id}"
            )));
        };

        match (accounts.first(), accounts.get(1)) {
            (Some(from), Some(to)) => Ok((*from as usize, *to as usize, lamports)),
            _ => Err(ExecutionError::Invalid(format!(
                "Instruction {index}: expected sender and receiver accounts"
            ))),
        }
    }

    /// Applies every instruction to `balances`, all or nothing.
    fn execute(
        &self,
        message: &Message,
        balances: &mut HashMap<Pubkey, u64>,
    ) -> Result<(), ExecutionError> {
        let required = message.header.num_required_signatures as usize;
        for index in 0..message.instructions.len() {
            let (from, to, lamports) = self.decode_transfer(message, index)?;
            if from >= required {
                return Err(ExecutionError::Invalid(format!(
                    "Instruction {index}: sender did not sign"
                )));
            }
            let from_key = message.account_keys[from];
            let to_key = *message.account_keys.get(to).ok_or_else(|| {
                ExecutionError::Invalid(format!("Instruction {index}: receiver out of range"))
            })?;

            let have = balances.get(&from_key).copied().unwrap_or(0);
            if have < lamports {
                return Err(ExecutionError::InsufficientLamports {
                    account: from_key,
                    have,
                    need: lamports,
                });
            }
            balances.insert(from_key, have - lamports);
            let credited = balances
                .get(&to_key)
                .copied()
                .unwrap_or(0)
                .checked_add(lamports)
                .ok_or_else(|| {
                    ExecutionError::Invalid(format!("Instruction {index}: receiver overflow"))
                })?;
            balances.insert(to_key, credited);
        }
        Ok(())
    }
}

#[async_trait]
impl SolanaProviderTrait for InMemoryLedger {
    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, SolanaProviderError> {
        let mut state = self.state.lock();
        let balance = state.balances.get(pubkey).copied().unwrap_or(0);
        let funded = balance.checked_add(lamports).ok_or_else(|| {
            SolanaProviderError::InvalidTransaction("airdrop overflows balance".to_string())
        })?;
        state.balances.insert(*pubkey, funded);

        state.issued += 1;
        let mut seed = pubkey.to_bytes().to_vec();
        seed.extend_from_slice(&state.issued.to_le_bytes());
        let signature = self.faucet.sign_message(&seed);
        let block_height = state.block_height;
        state.landed.insert(
            signature,
            LandedTransaction {
                block_height,
                error: None,
            },
        );
        debug!(%pubkey, lamports, %signature, "airdrop applied");
        Ok(signature)
    }

    async fn get_balance_with_slot(
        &self,
        pubkey: &Pubkey,
        _commitment: CommitmentConfig,
    ) -> Result<(u64, u64), SolanaProviderError> {
        let state = self.state.lock();
        let balance = state.balances.get(pubkey).copied().unwrap_or(0);
        Ok((balance, state.block_height))
    }

    async fn get_latest_blockhash_with_commitment(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError> {
        let mut state = self.state.lock();
        let blockhash = Self::next_blockhash(&mut state);
        let last_valid = state.block_height + BLOCKHASH_VALIDITY_BLOCKS;
        state.blockhashes.insert(blockhash, last_valid);
        Ok((blockhash, last_valid))
    }

    async fn get_block_height(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<u64, SolanaProviderError> {
        Ok(self.state.lock().block_height)
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<Signature, SolanaProviderError> {
        let tx: Transaction = bincode::deserialize(wire).map_err(|e| {
            SolanaProviderError::InvalidTransaction(format!("Failed to decode transaction: {e}"))
        })?;
        let message = &tx.message;

        let mut state = self.state.lock();
        let last_valid = state
            .blockhashes
            .get(&message.recent_blockhash)
            .copied()
            .ok_or_else(|| {
                SolanaProviderError::BlockhashNotFound(message.recent_blockhash.to_string())
            })?;
        if state.block_height > last_valid {
            return Err(SolanaProviderError::BlockhashNotFound(format!(
                "{} expired at block height {last_valid}",
                message.recent_blockhash
            )));
        }

        if message.header.num_required_signatures == 0 {
            return Err(SolanaProviderError::InvalidTransaction(
                "Transaction has no required signatures".to_string(),
            ));
        }
        if !Self::verify_signatures(&tx) {
            return Err(SolanaProviderError::InvalidTransaction(
                "Signature verification failure".to_string(),
            ));
        }
        let signature = tx.signatures[0];
        if state.landed.contains_key(&signature) {
            return Err(SolanaProviderError::AlreadyProcessed(signature.to_string()));
        }
        if state.drop_next > 0 {
            state.drop_next -= 1;
            debug!(%signature, "dropping submitted transaction");
            return Ok(signature);
        }

        let fee_payer = message.account_keys[0];
        let fee = self.lamports_per_signature * tx.signatures.len() as u64;
        let payer_balance = state.balances.get(&fee_payer).copied().unwrap_or(0);
        if payer_balance < fee {
            return Err(SolanaProviderError::InsufficientFunds(format!(
                "fee payer {fee_payer} has {payer_balance} lamports, fee is {fee}"
            )));
        }

        let mut after_fee = state.balances.clone();
        after_fee.insert(fee_payer, payer_balance - fee);
        let mut executed = after_fee.clone();

        let error = match self.execute(message, &mut executed) {
            Ok(()) => {
                state.balances = executed;
                None
            }
            Err(err) if self.skip_preflight => {
                state.balances = after_fee;
                Some(err.message())
            }
            Err(err) => return Err(err.into_provider_error()),
        };

        let block_height = state.block_height;
        state.landed.insert(
            signature,
            LandedTransaction {
                block_height,
                error,
            },
        );
        debug!(%signature, fee, block_height, "transaction landed");
        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError> {
        let mut state = self.state.lock();
        state.block_height += 1;

        let landed = match state.landed.get(signature) {
            Some(landed) => landed,
            None => return Ok(None),
        };
        let depth = state.block_height - landed.block_height;

        let status = match &landed.error {
            Some(reason) => SolanaTransactionStatus::Failed(reason.clone()),
            None if depth >= FINALIZATION_DEPTH => SolanaTransactionStatus::Finalized,
            None if depth >= CONFIRMATION_DEPTH => SolanaTransactionStatus::Confirmed,
            None => SolanaTransactionStatus::Processed,
        };
        Ok(Some(status))
    }

    async fn get_fee_for_message(&self, message: &Message) -> Result<u64, SolanaProviderError> {
        Ok(self.lamports_per_signature * message.header.num_required_signatures as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::Keypair;
    use solana_system_interface::instruction as system_instruction;

    async fn signed_transfer(
        ledger: &InMemoryLedger,
        from: &Keypair,
        to: &Pubkey,
        lamports: u64,
    ) -> Transaction {
        let (blockhash, _) = ledger
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await
            .unwrap();
        let ix = system_instruction::transfer(&from.pubkey(), to, lamports);
        Transaction::new_signed_with_payer(&[ix], Some(&from.pubkey()), &[from], blockhash)
    }

    #[tokio::test]
    async fn test_airdrop_credits_balance() {
        let ledger = InMemoryLedger::new();
        let account = Pubkey::new_unique();

        let signature = ledger.request_airdrop(&account, 1_000).await.unwrap();
        assert_eq!(ledger.balance(&account), 1_000);

        let status = ledger.get_signature_status(&signature).await.unwrap();
        assert_eq!(status, Some(SolanaTransactionStatus::Confirmed));
    }

    #[tokio::test]
    async fn test_system_transfer_charges_fee() {
        let ledger = InMemoryLedger::new();
        let from = Keypair::new();
        let to = Pubkey::new_unique();
        ledger.set_balance(&from.pubkey(), 1_000_000);

        let tx = signed_transfer(&ledger, &from, &to, 400_000).await;
        let wire = bincode::serialize(&tx).unwrap();
        let signature = ledger.send_raw_transaction(&wire).await.unwrap();

        assert_eq!(signature, tx.signatures[0]);
        assert_eq!(
            ledger.balance(&from.pubkey()),
            1_000_000 - 400_000 - DEFAULT_LAMPORTS_PER_SIGNATURE
        );
        assert_eq!(ledger.balance(&to), 400_000);
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_already_processed() {
        let ledger = InMemoryLedger::new();
        let from = Keypair::new();
        ledger.set_balance(&from.pubkey(), 1_000_000);

        let tx = signed_transfer(&ledger, &from, &Pubkey::new_unique(), 1).await;
        let wire = bincode::serialize(&tx).unwrap();
        ledger.send_raw_transaction(&wire).await.unwrap();

        let err = ledger.send_raw_transaction(&wire).await.unwrap_err();
        assert!(matches!(err, SolanaProviderError::AlreadyProcessed(_)));
    }

    #[tokio::test]
    async fn test_insufficient_funds_rejected_without_mutation() {
        let ledger = InMemoryLedger::new();
        let from = Keypair::new();
        let to = Pubkey::new_unique();
        ledger.set_balance(&from.pubkey(), 10_000);

        let tx = signed_transfer(&ledger, &from, &to, 50_000).await;
        let err = ledger
            .send_raw_transaction(&bincode::serialize(&tx).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, SolanaProviderError::InsufficientFunds(_)));
        assert_eq!(ledger.balance(&from.pubkey()), 10_000);
        assert_eq!(ledger.balance(&to), 0);
        assert_eq!(ledger.landed_count(), 0);
    }

    #[tokio::test]
    async fn test_skip_preflight_lands_failed_transaction() {
        let ledger = InMemoryLedger::new().with_skip_preflight(true);
        let from = Keypair::new();
        let to = Pubkey::new_unique();
        ledger.set_balance(&from.pubkey(), 10_000);

        let tx = signed_transfer(&ledger, &from, &to, 50_000).await;
        let signature = ledger
            .send_raw_transaction(&bincode::serialize(&tx).unwrap())
            .await
            .unwrap();

        assert_eq!(
            ledger.balance(&from.pubkey()),
            10_000 - DEFAULT_LAMPORTS_PER_SIGNATURE
        );
        assert_eq!(ledger.balance(&to), 0);
        match ledger.get_signature_status(&signature).await.unwrap() {
            Some(SolanaTransactionStatus::Failed(reason)) => {
                assert!(reason.contains("insufficient lamports"))
            }
            other => panic!("Expected failed status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_expired_blockhash_rejected() {
        let ledger = InMemoryLedger::new();
        let from = Keypair::new();
        ledger.set_balance(&from.pubkey(), 1_000_000);

        let tx = signed_transfer(&ledger, &from, &Pubkey::new_unique(), 1).await;
        ledger.advance_blocks(BLOCKHASH_VALIDITY_BLOCKS + 1);

        let err = ledger
            .send_raw_transaction(&bincode::serialize(&tx).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SolanaProviderError::BlockhashNotFound(_)));
        assert_eq!(ledger.balance(&from.pubkey()), 1_000_000);
    }

    #[tokio::test]
    async fn test_unsigned_transaction_rejected() {
        let ledger = InMemoryLedger::new();
        let from = Keypair::new();
        ledger.set_balance(&from.pubkey(), 1_000_000);

        let mut tx = signed_transfer(&ledger, &from, &Pubkey::new_unique(), 1).await;
        tx.signatures[0] = Signature::default();

        let err = ledger
            .send_raw_transaction(&bincode::serialize(&tx).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SolanaProviderError::InvalidTransaction(_)));
    }

    #[tokio::test]
    async fn test_transaction_without_signers_rejected() {
        let ledger = InMemoryLedger::new();
        let (blockhash, _) = ledger
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await
            .unwrap();
        let mut message = Message::new_with_blockhash(&[], None, &blockhash);
        message.header.num_required_signatures = 0;
        let tx = Transaction {
            signatures: vec![],
            message,
        };

        let err = ledger
            .send_raw_transaction(&bincode::serialize(&tx).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SolanaProviderError::InvalidTransaction(_)));
        assert_eq!(ledger.landed_count(), 0);
    }

    #[tokio::test]
    async fn test_status_progresses_to_finalized() {
        let ledger = InMemoryLedger::new();
        let from = Keypair::new();
        ledger.set_balance(&from.pubkey(), 1_000_000);

        let tx = signed_transfer(&ledger, &from, &Pubkey::new_unique(), 1).await;
        let signature = ledger
            .send_raw_transaction(&bincode::serialize(&tx).unwrap())
            .await
            .unwrap();

        assert_eq!(
            ledger.get_signature_status(&signature).await.unwrap(),
            Some(SolanaTransactionStatus::Confirmed)
        );
        ledger.advance_blocks(FINALIZATION_DEPTH);
        assert_eq!(
            ledger.get_signature_status(&signature).await.unwrap(),
            Some(SolanaTransactionStatus::Finalized)
        );
        assert_eq!(
            ledger
                .get_signature_status(&Signature::default())
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_dropped_submission_never_lands() {
        let ledger = InMemoryLedger::new();
        let from = Keypair::new();
        ledger.set_balance(&from.pubkey(), 1_000_000);
        ledger.drop_next_submissions(1);

        let tx = signed_transfer(&ledger, &from, &Pubkey::new_unique(), 1).await;
        let signature = ledger
            .send_raw_transaction(&bincode::serialize(&tx).unwrap())
            .await
            .unwrap();

        assert_eq!(ledger.get_signature_status(&signature).await.unwrap(), None);
        assert_eq!(ledger.balance(&from.pubkey()), 1_000_000);
    }

    #[tokio::test]
    async fn test_fee_quote_scales_with_signers() {
        let ledger = InMemoryLedger::new().with_lamports_per_signature(7);
        let payer = Pubkey::new_unique();
        let from = Pubkey::new_unique();
        let ix = system_instruction::transfer(&from, &Pubkey::new_unique(), 1);
        let message = Message::new(&[ix], Some(&payer));

        assert_eq!(ledger.get_fee_for_message(&message).await.unwrap(), 14);
    }
}
