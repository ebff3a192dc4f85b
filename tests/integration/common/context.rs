//! Test context for runs against a live validator.
//!
//! ```ignore
//! let ctx = SolanaTestContext::new()?;
//! let sender = ctx.funded_account(10 * SOL).await?;
//! ```

use super::logging::init_test_logging;
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tracing::info;

use sol_transfer_harness::{
    config::HarnessConfig,
    domain::{fund_account, FlowSettings, SubmissionClient, TransferFlow},
    models::Account,
    services::SolanaProvider,
    utils::TokioClock,
};

pub const SOL: u64 = 1_000_000_000;

/// Bundles configuration, the confirmation client, and a transfer flow bound
/// to the validator at `SOLANA_RPC_URL`.
pub struct SolanaTestContext {
    pub config: HarnessConfig,
    pub flow: TransferFlow<SolanaProvider, TokioClock>,
}

impl SolanaTestContext {
    pub fn new() -> Result<Self> {
        init_test_logging();
        let config = HarnessConfig::from_env().wrap_err("Failed to load configuration")?;
        let provider = SolanaProvider::new(&config.rpc)?;
        info!(rpc_url = %config.rpc.url, tier = %config.finality_tier, "integration context ready");

        let client = SubmissionClient::with_clock(
            Arc::new(provider),
            Arc::new(TokioClock),
            config.confirmation_poll_interval,
        );
        let flow = TransferFlow::new(client, FlowSettings::from(&config));
        Ok(Self { config, flow })
    }

    /// Generates an account and airdrops `lamports` to it.
    pub async fn funded_account(&self, lamports: u64) -> Result<Account> {
        let account = Account::generate();
        fund_account(
            self.flow.client(),
            &account.address(),
            lamports,
            self.config.finality_tier,
        )
        .await
        .wrap_err_with(|| format!("Failed to fund {}", account.address()))?;
        Ok(account)
    }
}
