//! Post-condition checks on sender and receiver balances.
//!
//! The accounting model: the receiver gains exactly the transfer amount; the
//! sender loses the amount plus, when it also pays the fee, a network fee no
//! larger than the configured upper bound.

use tracing::debug;

use crate::models::{BalancePair, BalanceSnapshot, VerificationFailure};

/// Who covers the network fee of the verified transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeMode {
    /// The sender is also the fee payer.
    #[default]
    SenderPays,
    /// A different account pays the fee; the sender loses exactly the amount.
    ThirdParty,
}

impl FeeMode {
    /// Fee bound to apply to the sender's balance.
    pub fn sender_fee_bound(&self, fee_upper_bound: u64) -> u64 {
        match self {
            FeeMode::SenderPays => fee_upper_bound,
            FeeMode::ThirdParty => 0,
        }
    }
}

fn ensure_same_account(
    role: &'static str,
    pre: &BalanceSnapshot,
    post: &BalanceSnapshot,
) -> Result<(), VerificationFailure> {
    if pre.account != post.account {
        return Err(VerificationFailure::SnapshotAccountMismatch {
            role,
            before: pre.account,
            after: post.account,
        });
    }
    Ok(())
}

/// Checks `post` against `pre` for a transfer of `amount` lamports.
///
/// Pure: the same inputs always produce the same result.
pub fn verify_transfer_balances(
    pre: &BalancePair,
    post: &BalancePair,
    amount: u64,
    fee_upper_bound: u64,
) -> Result<(), VerificationFailure> {
    ensure_same_account("sender", &pre.sender, &post.sender)?;
    ensure_same_account("receiver", &pre.receiver, &post.receiver)?;

    let receiver_before = pre.receiver.lamports;
    let expected = receiver_before
        .checked_add(amount)
        .ok_or(VerificationFailure::ReceiverOverflow {
            before: receiver_before,
            amount,
        })?;
    if post.receiver.lamports != expected {
        return Err(VerificationFailure::ReceiverMismatch {
            before: receiver_before,
            amount,
            expected,
            actual: post.receiver.lamports,
        });
    }

    let sender_before = pre.sender.lamports;
    let sender_after = post.sender.lamports;
    if sender_after >= sender_before {
        return Err(VerificationFailure::SenderNotDecreased {
            before: sender_before,
            after: sender_after,
        });
    }

    let min_expected = sender_before
        .saturating_sub(amount)
        .saturating_sub(fee_upper_bound);
    if sender_after < min_expected {
        return Err(VerificationFailure::SenderBelowLowerBound {
            before: sender_before,
            after: sender_after,
            amount,
            fee_upper_bound,
            min_expected,
        });
    }

    debug!(
        sender_delta = sender_before - sender_after,
        receiver_delta = amount,
        fee = (sender_before - sender_after).saturating_sub(amount),
        "balances verified"
    );
    Ok(())
}

/// `verify_transfer_balances` with the fee bound chosen by who paid the fee.
pub fn verify_with_fee_mode(
    pre: &BalancePair,
    post: &BalancePair,
    amount: u64,
    fee_upper_bound: u64,
    mode: FeeMode,
) -> Result<(), VerificationFailure> {
    verify_transfer_balances(pre, post, amount, mode.sender_fee_bound(fee_upper_bound))
}
