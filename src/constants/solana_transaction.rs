//! Constants for Solana transfer processing.
//!
//! Default values used when building, submitting, and confirming native
//! transfers, plus the accounting defaults used by the balance verifier.

use std::time::Duration;

/// Anchor method preimage for the `transfer_sol` instruction discriminator.
pub const TRANSFER_SOL_DISCRIMINATOR_PREIMAGE: &str = "global:transfer_sol";

/// Program that exposes `transfer_sol(amount)` on the test cluster.
pub const DEFAULT_TRANSFER_PROGRAM_ID: &str = "CFHwnFymbR5LSp8TBqUnVJZvWaEFb79xj3723TJviGkw";

/// Default lamports charged per required signature.
pub const DEFAULT_LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Conservative fee estimate for a single-signer transfer (0.000005 SOL).
pub const DEFAULT_FEE_UPPER_BOUND_LAMPORTS: u64 = 5_000;

/// Number of blocks a recent blockhash remains valid after it is issued.
pub const BLOCKHASH_VALIDITY_BLOCKS: u64 = 150;

/// Default delay between two signature status polls (in milliseconds)
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 500;

/// Get the default confirmation poll interval
pub fn get_default_confirmation_poll_interval() -> Duration {
    Duration::from_millis(DEFAULT_CONFIRMATION_POLL_INTERVAL_MS)
}
