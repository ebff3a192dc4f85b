//! Configuration for the JSON-RPC endpoint.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RPC_TIMEOUT_SECONDS, DEFAULT_SOLANA_RPC_URL};

/// Configuration for an RPC endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcConfig {
    /// The RPC endpoint URL.
    pub url: String,
    /// Request timeout applied to every call.
    pub timeout_seconds: u64,
}

impl RpcConfig {
    /// Creates a new RPC configuration with the given URL and default timeout.
    pub fn new(url: String) -> Self {
        Self {
            url,
            timeout_seconds: DEFAULT_RPC_TIMEOUT_SECONDS,
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SOLANA_RPC_URL.to_string())
    }
}
