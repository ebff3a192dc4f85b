//! Funds a fresh sender and receiver, transfers SOL between them, and prints
//! the balances before and after.

use color_eyre::{eyre::WrapErr, Result};
use dotenvy::dotenv;
use futures::try_join;
use std::sync::Arc;
use tracing::info;

use sol_transfer_harness::{
    config::{HarnessConfig, LedgerMode},
    domain::{fund_account, FlowSettings, SubmissionClient, TransferFlow},
    logging::setup_logging,
    models::{Account, TransferIntent},
    services::{InMemoryLedger, SolanaProvider, SolanaProviderTrait},
    utils::{format_lamports_as_sol, NoopClock, PollClock, TokioClock},
};

async fn run<P, C>(provider: Arc<P>, clock: Arc<C>, config: &HarnessConfig) -> Result<()>
where
    P: SolanaProviderTrait,
    C: PollClock,
{
    let client = SubmissionClient::with_clock(provider, clock, config.confirmation_poll_interval);
    let tier = config.finality_tier;

    let sender = Account::generate();
    let receiver = Account::generate();
    let sender_address = sender.address();
    let receiver_address = receiver.address();
    info!(sender = %sender_address, receiver = %receiver_address, "generated accounts");

    try_join!(
        fund_account(&client, &sender_address, config.sender_funding_lamports, tier),
        fund_account(
            &client,
            &receiver_address,
            config.receiver_funding_lamports,
            tier
        ),
    )
    .wrap_err("Failed to fund accounts")?;

    let intent = TransferIntent::new(sender, receiver, config.transfer_lamports)?;
    let flow = TransferFlow::new(client, FlowSettings::from(config));
    let report = flow.execute(&intent, None).await?;

    println!(
        "Sender balance before:   {} SOL",
        format_lamports_as_sol(report.pre.sender.lamports)
    );
    println!(
        "Receiver balance before: {} SOL",
        format_lamports_as_sol(report.pre.receiver.lamports)
    );
    println!("Transaction signature:   {}", report.signature);
    println!(
        "Sender balance after:    {} SOL",
        format_lamports_as_sol(report.post.sender.lamports)
    );
    println!(
        "Receiver balance after:  {} SOL",
        format_lamports_as_sol(report.post.receiver.lamports)
    );
    println!(
        "Fee paid by sender:      {} SOL",
        format_lamports_as_sol(report.fee_paid_by_sender())
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // Load environment variables from .env file
    dotenv().ok();
    setup_logging();

    let config = HarnessConfig::from_env().wrap_err("Failed to load configuration")?;
    info!(
        ledger = %config.ledger_mode,
        rpc_url = %config.rpc.url,
        tier = %config.finality_tier,
        "starting transfer harness"
    );

    match config.ledger_mode {
        LedgerMode::Rpc => {
            let provider = SolanaProvider::new(&config.rpc)?;
            run(Arc::new(provider), Arc::new(TokioClock), &config).await
        }
        LedgerMode::Memory => {
            let ledger = InMemoryLedger::new()
                .with_transfer_program(config.transfer_program.program_id());
            run(Arc::new(ledger), Arc::new(NoopClock), &config).await
        }
    }
}
