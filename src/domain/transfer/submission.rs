//! Submission of signed transactions and confirmation polling.
//!
//! Submission is a single `sendTransaction` call. Confirmation polls the
//! signature status until the requested finality tier is reached, the
//! transaction fails on-chain, or the chain's block height passes the
//! transaction's last valid block height. The bound is block height, never an
//! attempt count.

use solana_sdk::signature::Signature;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};

use crate::{
    constants::get_default_confirmation_poll_interval,
    models::{
        AssembledTransaction, ConfirmationReceipt, ConfirmationStatus, FinalityTier,
        FreshnessToken, SolanaTransactionStatus, TransferError,
    },
    services::{SolanaProviderError, SolanaProviderTrait},
    utils::{PollClock, TokioClock},
};

pub struct SubmissionClient<P, C = TokioClock>
where
    P: SolanaProviderTrait,
    C: PollClock,
{
    provider: Arc<P>,
    clock: Arc<C>,
    poll_interval: Duration,
}

impl<P: SolanaProviderTrait> SubmissionClient<P, TokioClock> {
    /// Creates a client that sleeps on the tokio timer between polls.
    pub fn new(provider: Arc<P>) -> Self {
        Self::with_clock(
            provider,
            Arc::new(TokioClock),
            get_default_confirmation_poll_interval(),
        )
    }
}

impl<P, C> SubmissionClient<P, C>
where
    P: SolanaProviderTrait,
    C: PollClock,
{
    pub fn with_clock(provider: Arc<P>, clock: Arc<C>, poll_interval: Duration) -> Self {
        Self {
            provider,
            clock,
            poll_interval,
        }
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    pub fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Sends the transaction once.
    ///
    /// Every required signature is checked locally first; a transaction with
    /// missing or invalid signatures never reaches the network.
    pub async fn submit(
        &self,
        transaction: &AssembledTransaction,
    ) -> Result<Signature, TransferError> {
        let wire = transaction.wire_bytes()?;
        let freshness = transaction.freshness();

        match self.provider.send_raw_transaction(&wire).await {
            Ok(signature) => {
                info!(
                    %signature,
                    fee_payer = %transaction.fee_payer(),
                    last_valid_block_height = freshness.last_valid_block_height,
                    "transaction submitted"
                );
                Ok(signature)
            }
            Err(SolanaProviderError::BlockhashNotFound(msg)) => {
                warn!(error = %msg, "ledger no longer accepts the transaction blockhash");
                Err(TransferError::ConfirmationExpired {
                    signature: transaction.signature().unwrap_or_default(),
                    last_valid_block_height: freshness.last_valid_block_height,
                    block_height: None,
                })
            }
            Err(e) if e.is_network_level() => {
                warn!(error = %e, "network error while submitting transaction");
                Err(TransferError::SubmissionNetworkError(e))
            }
            Err(e) => {
                warn!(error = %e, "ledger rejected transaction");
                Err(TransferError::SubmissionRejected(e))
            }
        }
    }

    /// Polls until `signature` reaches `tier`, fails, or expires.
    pub async fn await_confirmation(
        &self,
        signature: Signature,
        freshness: &FreshnessToken,
        tier: FinalityTier,
    ) -> Result<ConfirmationReceipt, TransferError> {
        let commitment = tier.commitment();
        let mut polls: u32 = 0;
        let mut last_height: Option<u64> = None;

        loop {
            polls += 1;
            // Recomputed on every poll: a status seen on an abandoned fork can
            // disappear again, and the transaction is then subject to expiry.
            let mut landed = false;
            match self.provider.get_signature_status(&signature).await {
                Ok(Some(status)) => {
                    if let Some(receipt) =
                        Self::settle(signature, &status, tier, last_height, polls)?
                    {
                        return Ok(receipt);
                    }
                    debug!(%signature, ?status, "transaction landed, waiting for {tier}");
                    landed = true;
                }
                Ok(None) => {}
                Err(e) if e.is_transient() => {
                    warn!(%signature, error = %e, "transient error polling signature status");
                }
                Err(e) => return Err(TransferError::Provider(e)),
            }

            match self.provider.get_block_height(commitment).await {
                Ok(height) => {
                    last_height = Some(height);
                    // Only a transaction currently observed on-chain is exempt from expiry.
                    if !landed && !freshness.is_valid_at(height) {
                        if let Some(receipt) = self
                            .recheck_before_expiry(signature, freshness, tier, height, polls)
                            .await?
                        {
                            return Ok(receipt);
                        }
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!(%signature, error = %e, "transient error reading block height");
                }
                Err(e) => return Err(TransferError::Provider(e)),
            }

            self.clock.sleep(self.poll_interval).await;
        }
    }

    /// One more status read once the block height passed the token, so a
    /// transaction that landed at the last moment is not reported expired.
    ///
    /// Returns `Ok(None)` when the transaction turns out to have landed but
    /// has not reached `tier` yet. The next poll decides again whether it is
    /// still on-chain.
    async fn recheck_before_expiry(
        &self,
        signature: Signature,
        freshness: &FreshnessToken,
        tier: FinalityTier,
        height: u64,
        polls: u32,
    ) -> Result<Option<ConfirmationReceipt>, TransferError> {
        let expired = TransferError::ConfirmationExpired {
            signature,
            last_valid_block_height: freshness.last_valid_block_height,
            block_height: Some(height),
        };

        match self.provider.get_signature_status(&signature).await {
            Ok(Some(status)) => Self::settle(signature, &status, tier, Some(height), polls + 1),
            Ok(None) => {
                warn!(
                    %signature,
                    block_height = height,
                    last_valid_block_height = freshness.last_valid_block_height,
                    "transaction expired before landing"
                );
                Err(expired)
            }
            Err(e) => {
                warn!(%signature, error = %e, "status re-check failed, reporting expiry");
                Err(expired)
            }
        }
    }

    /// Maps an observed status to a terminal outcome, or `None` to keep polling.
    fn settle(
        signature: Signature,
        status: &SolanaTransactionStatus,
        tier: FinalityTier,
        block_height: Option<u64>,
        polls: u32,
    ) -> Result<Option<ConfirmationReceipt>, TransferError> {
        if let SolanaTransactionStatus::Failed(reason) = status {
            warn!(%signature, %reason, "transaction failed on-chain");
            return Err(TransferError::ConfirmationFailed {
                signature,
                reason: reason.clone(),
            });
        }
        if !tier.is_satisfied_by(status) {
            return Ok(None);
        }

        let status = ConfirmationStatus::from(status);
        info!(%signature, %status, polls, "transaction confirmed");
        Ok(Some(ConfirmationReceipt {
            signature,
            status,
            block_height,
            polls,
        }))
    }
}
