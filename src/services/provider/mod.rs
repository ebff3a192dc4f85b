//! Ledger providers: the JSON-RPC client used against real clusters and an
//! in-process ledger with the same interface.

mod solana;
pub use solana::*;

mod in_memory;
pub use in_memory::*;
