//! Harness for native SOL transfers: builds the transfer instruction,
//! assembles and signs the transaction, submits it, waits for the requested
//! finality, and checks the resulting balances against the accounting model.

pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
