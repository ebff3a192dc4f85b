//! Faucet funding for test accounts.

use solana_sdk::pubkey::Pubkey;
use tracing::info;

use super::SubmissionClient;
use crate::{
    models::{ConfirmationReceipt, FinalityTier, FreshnessToken, TransferError},
    services::SolanaProviderTrait,
    utils::PollClock,
};

/// Requests an airdrop of `lamports` to `address` and waits until it reaches
/// `tier`, using the same confirmation polling as transfers.
pub async fn fund_account<P, C>(
    client: &SubmissionClient<P, C>,
    address: &Pubkey,
    lamports: u64,
    tier: FinalityTier,
) -> Result<ConfirmationReceipt, TransferError>
where
    P: SolanaProviderTrait,
    C: PollClock,
{
    let provider = client.provider();
    let (blockhash, last_valid_block_height) = provider
        .get_latest_blockhash_with_commitment(tier.commitment())
        .await?;
    let freshness = FreshnessToken::new(blockhash, last_valid_block_height);

    let signature = provider.request_airdrop(address, lamports).await?;
    info!(%address, lamports, %signature, "airdrop requested");

    client
        .await_confirmation(signature, &freshness, tier)
        .await
}
