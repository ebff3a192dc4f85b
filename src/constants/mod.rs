//! Constants shared across the transfer harness.

mod solana_transaction;
pub use solana_transaction::*;

mod config;
pub use config::*;
