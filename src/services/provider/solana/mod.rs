//! Solana Provider Module
//!
//! This module provides an abstraction layer over the Solana RPC client,
//! offering the operations the transfer harness needs: funding accounts,
//! reading balances, fetching freshness tokens, sending raw transactions, and
//! querying signature statuses.
//!
//! The provider uses the non-blocking `RpcClient`, which supports concurrent
//! outstanding requests, so one provider can be shared by many flows.
//! Nothing here retries: the caller decides what to do with each error.

mod error;
pub use error::*;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
#[cfg(test)]
use mockall::automock;
use reqwest::Url;
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_request::RpcRequest};
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, message::Message, pubkey::Pubkey,
    signature::Signature,
};
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::debug;

use crate::{config::RpcConfig, models::SolanaTransactionStatus};

/// A trait that abstracts the ledger operations used by the harness.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaProviderTrait: Send + Sync {
    /// Requests a faucet grant of `lamports` to `pubkey` (test clusters only).
    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, SolanaProviderError>;

    /// Retrieves the balance (in lamports) together with the slot it was read at.
    async fn get_balance_with_slot(
        &self,
        pubkey: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<(u64, u64), SolanaProviderError>;

    /// Retrieves the latest blockhash and its last valid block height.
    async fn get_latest_blockhash_with_commitment(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError>;

    /// Retrieves the current block height.
    async fn get_block_height(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<u64, SolanaProviderError>;

    /// Sends a serialized, signed transaction. Returns the transaction signature.
    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<Signature, SolanaProviderError>;

    /// Returns the signature status, or `None` if the ledger has not seen it.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError>;

    /// Quotes the fee the ledger would charge for `message`.
    async fn get_fee_for_message(&self, message: &Message) -> Result<u64, SolanaProviderError>;
}

#[derive(Clone)]
pub struct SolanaProvider {
    client: Arc<RpcClient>,
    // Default timeout
    timeout: Duration,
    // Commitment used for preflight simulation
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for SolanaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaProvider")
            .field("url", &self.client.url())
            .field("timeout", &self.timeout)
            .field("commitment", &self.commitment)
            .finish()
    }
}

impl SolanaProvider {
    pub fn new(config: &RpcConfig) -> Result<Self, SolanaProviderError> {
        Self::new_with_commitment(config, CommitmentConfig::confirmed())
    }

    /// Creates a new SolanaProvider for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns `SolanaProviderError::NetworkConfiguration` if the URL does not parse.
    pub fn new_with_commitment(
        config: &RpcConfig,
        commitment: CommitmentConfig,
    ) -> Result<Self, SolanaProviderError> {
        let rpc_url: Url = config.url.parse().map_err(|e| {
            SolanaProviderError::NetworkConfiguration(format!("Invalid URL format: {e}"))
        })?;
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client =
            RpcClient::new_with_timeout_and_commitment(rpc_url.to_string(), timeout, commitment);

        Ok(Self {
            client: Arc::new(client),
            timeout,
            commitment,
        })
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }
}

#[async_trait]
impl SolanaProviderTrait for SolanaProvider {
    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, SolanaProviderError> {
        debug!(%pubkey, lamports, "requesting airdrop");
        self.client
            .request_airdrop(pubkey, lamports)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_balance_with_slot(
        &self,
        pubkey: &Pubkey,
        commitment: CommitmentConfig,
    ) -> Result<(u64, u64), SolanaProviderError> {
        let response = self
            .client
            .get_balance_with_commitment(pubkey, commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)?;
        Ok((response.value, response.context.slot))
    }

    async fn get_latest_blockhash_with_commitment(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError> {
        self.client
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_block_height(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<u64, SolanaProviderError> {
        self.client
            .get_block_height_with_commitment(commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    /// Sends the base64-encoded wire bytes through `sendTransaction` with
    /// preflight enabled, so funds and blockhash problems surface here.
    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<Signature, SolanaProviderError> {
        debug!(
            bytes = wire.len(),
            timeout_secs = self.timeout.as_secs(),
            "sending raw transaction"
        );
        let params = serde_json::json!([
            STANDARD.encode(wire),
            {
                "encoding": "base64",
                "preflightCommitment": self.commitment.commitment,
            }
        ]);
        let signature: String = self
            .client
            .send(RpcRequest::SendTransaction, params)
            .await
            .map_err(SolanaProviderError::from_rpc_error)?;

        Signature::from_str(&signature).map_err(|e| {
            SolanaProviderError::RpcError(format!("Invalid signature returned by node: {e}"))
        })
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SolanaTransactionStatus>, SolanaProviderError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(SolanaProviderError::from_rpc_error)?;

        let status = match response.value.into_iter().next().flatten() {
            Some(status) => status,
            None => return Ok(None),
        };

        let mapped = if let Some(err) = &status.err {
            SolanaTransactionStatus::Failed(err.to_string())
        } else if status.satisfies_commitment(CommitmentConfig::finalized()) {
            SolanaTransactionStatus::Finalized
        } else if status.satisfies_commitment(CommitmentConfig::confirmed()) {
            SolanaTransactionStatus::Confirmed
        } else {
            SolanaTransactionStatus::Processed
        };
        Ok(Some(mapped))
    }

    async fn get_fee_for_message(&self, message: &Message) -> Result<u64, SolanaProviderError> {
        self.client
            .get_fee_for_message(message)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }
}
