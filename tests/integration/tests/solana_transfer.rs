//! Transfers against a live validator.

use eyre::Result;
use sol_transfer_harness::models::{FlowStage, TransferIntent};
use tracing::info;

use crate::integration::common::context::{SolanaTestContext, SOL};

#[tokio::test]
async fn test_transfer_two_sol() -> Result<()> {
    let ctx = SolanaTestContext::new()?;
    let sender = ctx.funded_account(10 * SOL).await?;
    let receiver = ctx.funded_account(SOL).await?;

    let intent = TransferIntent::new(sender, receiver, 2 * SOL)?;
    let report = ctx.flow.execute(&intent, None).await?;
    info!(signature = %report.signature, fee = report.fee_paid_by_sender(), "transfer verified");

    assert_eq!(report.receiver_delta(), 2 * SOL);
    assert!(report.fee_paid_by_sender() <= ctx.config.fee_upper_bound_lamports);
    Ok(())
}

#[tokio::test]
async fn test_transfer_more_than_balance_is_rejected() -> Result<()> {
    let ctx = SolanaTestContext::new()?;
    let sender = ctx.funded_account(SOL).await?;
    let receiver = ctx.funded_account(SOL).await?;

    let intent = TransferIntent::new(sender, receiver, 2 * SOL)?;
    let err = ctx
        .flow
        .execute(&intent, None)
        .await
        .expect_err("transfer above balance should fail");

    assert_eq!(err.stage, FlowStage::Submit);
    assert!(err.source.is_insufficient_funds());
    Ok(())
}

#[tokio::test]
async fn test_third_party_fee_payer() -> Result<()> {
    let ctx = SolanaTestContext::new()?;
    let sender = ctx.funded_account(10 * SOL).await?;
    let receiver = ctx.funded_account(SOL).await?;
    let payer = ctx.funded_account(SOL).await?;

    let intent = TransferIntent::new(sender, receiver, 2 * SOL)?;
    let report = ctx.flow.execute(&intent, Some(&payer)).await?;

    assert_eq!(report.sender_delta(), 2 * SOL);
    assert_eq!(report.fee_payer, payer.address());
    Ok(())
}
