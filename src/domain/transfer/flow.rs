//! End-to-end transfer flow: snapshot, build, assemble, sign, submit,
//! confirm, snapshot, verify.

use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature};
use tracing::{info, instrument, warn};

use super::{
    assemble, build_transfer_instruction, sign, verify_with_fee_mode, AccountLocks, FeeMode,
    SubmissionClient,
};
use crate::{
    config::HarnessConfig,
    constants::DEFAULT_FEE_UPPER_BOUND_LAMPORTS,
    models::{
        Account, BalancePair, BalanceSnapshot, ConfirmationReceipt, FinalityTier, FlowError,
        FlowStage, FreshnessToken, TransferError, TransferIntent, TransferProgram,
    },
    services::SolanaProviderTrait,
    utils::{PollClock, TokioClock},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSettings {
    pub program: TransferProgram,
    pub finality_tier: FinalityTier,
    pub fee_upper_bound_lamports: u64,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            program: TransferProgram::default(),
            finality_tier: FinalityTier::default(),
            fee_upper_bound_lamports: DEFAULT_FEE_UPPER_BOUND_LAMPORTS,
        }
    }
}

impl From<&HarnessConfig> for FlowSettings {
    fn from(config: &HarnessConfig) -> Self {
        Self {
            program: config.transfer_program,
            finality_tier: config.finality_tier,
            fee_upper_bound_lamports: config.fee_upper_bound_lamports,
        }
    }
}

/// Outcome of a verified transfer.
#[derive(Debug, Clone)]
pub struct TransferReport {
    pub signature: Signature,
    pub receipt: ConfirmationReceipt,
    pub fee_payer: Pubkey,
    pub amount: u64,
    /// Fee quoted by the ledger for the assembled message, if it answered.
    pub quoted_fee: Option<u64>,
    pub pre: BalancePair,
    pub post: BalancePair,
}

impl TransferReport {
    /// Lamports the sender lost, fee included when it paid one.
    pub fn sender_delta(&self) -> u64 {
        self.pre
            .sender
            .lamports
            .saturating_sub(self.post.sender.lamports)
    }

    pub fn receiver_delta(&self) -> u64 {
        self.post
            .receiver
            .lamports
            .saturating_sub(self.pre.receiver.lamports)
    }

    /// Portion of the sender's loss beyond the transferred amount.
    pub fn fee_paid_by_sender(&self) -> u64 {
        self.sender_delta().saturating_sub(self.amount)
    }
}

pub struct TransferFlow<P, C = TokioClock>
where
    P: SolanaProviderTrait,
    C: PollClock,
{
    client: SubmissionClient<P, C>,
    settings: FlowSettings,
    locks: AccountLocks,
}

impl<P, C> TransferFlow<P, C>
where
    P: SolanaProviderTrait,
    C: PollClock,
{
    pub fn new(client: SubmissionClient<P, C>, settings: FlowSettings) -> Self {
        Self {
            client,
            settings,
            locks: AccountLocks::new(),
        }
    }

    /// Shares account locks with other flows driving the same accounts.
    pub fn with_locks(mut self, locks: AccountLocks) -> Self {
        self.locks = locks;
        self
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    pub fn client(&self) -> &SubmissionClient<P, C> {
        &self.client
    }

    /// Reads sender and receiver balances at `commitment`.
    pub async fn snapshot(
        &self,
        sender: &Pubkey,
        receiver: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<BalancePair, TransferError> {
        let provider = self.client.provider();
        let (sender_lamports, sender_slot) =
            provider.get_balance_with_slot(sender, commitment).await?;
        let (receiver_lamports, receiver_slot) =
            provider.get_balance_with_slot(receiver, commitment).await?;

        Ok(BalancePair {
            sender: BalanceSnapshot::new(*sender, sender_lamports, sender_slot),
            receiver: BalanceSnapshot::new(*receiver, receiver_lamports, receiver_slot),
        })
    }

    async fn fetch_freshness(&self) -> Result<FreshnessToken, TransferError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .provider()
            .get_latest_blockhash_with_commitment(self.settings.finality_tier.commitment())
            .await?;
        Ok(FreshnessToken::new(blockhash, last_valid_block_height))
    }

    /// Runs one transfer to completion.
    ///
    /// `fee_payer` defaults to the sender. Sender, receiver and fee payer are
    /// locked against other flows until post balances are verified.
    #[instrument(
        skip_all,
        fields(
            sender = %intent.sender().address(),
            receiver = %intent.receiver().address(),
            amount = intent.amount(),
        )
    )]
    pub async fn execute(
        &self,
        intent: &TransferIntent,
        fee_payer: Option<&Account>,
    ) -> Result<TransferReport, FlowError> {
        let sender = intent.sender();
        let receiver = intent.receiver();
        let fee_payer = fee_payer.unwrap_or(sender);
        let fee_mode = if fee_payer.address() == sender.address() {
            FeeMode::SenderPays
        } else {
            FeeMode::ThirdParty
        };
        let tier = self.settings.finality_tier;

        let _guard = self
            .locks
            .lock_all(&[sender.address(), receiver.address(), fee_payer.address()])
            .await;

        let pre = self
            .snapshot(&sender.address(), &receiver.address(), tier.commitment())
            .await
            .map_err(|e| FlowError::new(FlowStage::Snapshot, e))?;
        let fail = |stage: FlowStage, e: TransferError| {
            FlowError::new(stage, e).with_pre_balances(pre.clone())
        };

        let instruction = build_transfer_instruction(intent, &self.settings.program)
            .map_err(|e| fail(FlowStage::Build, e))?;

        let freshness = self
            .fetch_freshness()
            .await
            .map_err(|e| fail(FlowStage::Assemble, e))?;
        let mut transaction = assemble(&[instruction], fee_payer, freshness)
            .map_err(|e| fail(FlowStage::Assemble, e))?;

        let quoted_fee = match self
            .client
            .provider()
            .get_fee_for_message(&transaction.transaction().message)
            .await
        {
            Ok(fee) => {
                if fee_mode == FeeMode::SenderPays && fee > self.settings.fee_upper_bound_lamports
                {
                    warn!(
                        quoted_fee = fee,
                        fee_upper_bound = self.settings.fee_upper_bound_lamports,
                        "quoted fee exceeds the verification bound"
                    );
                }
                Some(fee)
            }
            Err(e) => {
                warn!(error = %e, "could not quote fee");
                None
            }
        };

        let mut keys = vec![fee_payer.clone()];
        if sender.address() != fee_payer.address() {
            keys.push(sender.clone());
        }
        sign(&mut transaction, &keys)
            .await
            .map_err(|e| fail(FlowStage::Sign, e))?;

        let signature = self
            .client
            .submit(&transaction)
            .await
            .map_err(|e| fail(FlowStage::Submit, e))?;
        let with_signature =
            |stage: FlowStage, e: TransferError| fail(stage, e).with_signature(signature);

        let receipt = self
            .client
            .await_confirmation(signature, transaction.freshness(), tier)
            .await
            .map_err(|e| with_signature(FlowStage::Confirm, e))?;

        let post = self
            .snapshot(&sender.address(), &receiver.address(), tier.commitment())
            .await
            .map_err(|e| with_signature(FlowStage::Snapshot, e))?;

        verify_with_fee_mode(
            &pre,
            &post,
            intent.amount(),
            self.settings.fee_upper_bound_lamports,
            fee_mode,
        )
        .map_err(|e| with_signature(FlowStage::Verify, e.into()))?;

        let report = TransferReport {
            signature,
            receipt,
            fee_payer: fee_payer.address(),
            amount: intent.amount(),
            quoted_fee,
            pre,
            post,
        };
        info!(
            %signature,
            sender_delta = report.sender_delta(),
            receiver_delta = report.receiver_delta(),
            fee = report.fee_paid_by_sender(),
            "transfer verified"
        );
        Ok(report)
    }
}
