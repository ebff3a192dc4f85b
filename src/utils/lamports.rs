//! Conversions between decimal SOL amounts and lamports.
use solana_sdk::native_token::LAMPORTS_PER_SOL;

use crate::models::TransferError;

/// Number of decimal places in one SOL.
const SOL_DECIMALS: usize = 9;

/// Parses a decimal SOL amount ("2", "0.5", "1.000000001") into lamports.
///
/// Rejects empty input, more than nine fractional digits, and amounts that do
/// not fit in a `u64`.
pub fn parse_sol_to_lamports(sol: &str) -> Result<u64, TransferError> {
    let invalid = |reason: &str| TransferError::InvalidAmount(format!("{sol:?}: {reason}"));

    let trimmed = sol.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid("not a decimal number"));
    }
    if fraction.len() > SOL_DECIMALS {
        return Err(invalid("more than 9 decimal places"));
    }

    let whole_lamports = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .ok()
            .and_then(|w| w.checked_mul(LAMPORTS_PER_SOL))
            .ok_or_else(|| invalid("amount overflows u64 lamports"))?
    };
    let fraction_lamports = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<SOL_DECIMALS$}")
            .parse::<u64>()
            .map_err(|_| invalid("not a decimal number"))?
    };

    whole_lamports
        .checked_add(fraction_lamports)
        .ok_or_else(|| invalid("amount overflows u64 lamports"))
}

/// Formats lamports as a decimal SOL string without trailing zeros.
pub fn format_lamports_as_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let fraction = lamports % LAMPORTS_PER_SOL;
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{fraction:0>SOL_DECIMALS$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
