//! Data model of the transfer harness: accounts, transfer intents, assembled
//! transactions, confirmation receipts, and balance snapshots.

mod account;
pub use account::*;

mod transfer;
pub use transfer::*;

mod transaction;
pub use transaction::*;

mod balance;
pub use balance::*;

mod error;
pub use error::*;
