//! Defaults for environment-driven configuration.

pub const DEFAULT_SOLANA_RPC_URL: &str = "http://127.0.0.1:8899";

pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;

/// 10 SOL
pub const DEFAULT_SENDER_FUNDING_LAMPORTS: u64 = 10_000_000_000;

/// 1 SOL
pub const DEFAULT_RECEIVER_FUNDING_LAMPORTS: u64 = 1_000_000_000;

/// 2 SOL
pub const DEFAULT_TRANSFER_LAMPORTS: u64 = 2_000_000_000;

pub const DEFAULT_LOG_LEVEL: &str = "info";
