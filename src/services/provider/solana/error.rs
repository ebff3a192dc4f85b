//! Classification of Solana RPC failures.

use serde::Serialize;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_sdk::transaction::TransactionError;
use thiserror::Error;

/// Errors that can occur when talking to the ledger.
///
/// Use `is_transient()` to decide whether a read may be repeated. Submission is
/// never repeated regardless of the classification.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SolanaProviderError {
    /// Network/IO error (transient - connection issues, timeouts)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// RPC protocol error (transient - node lag, sync pending)
    #[error("RPC error: {0}")]
    RpcError(String),

    /// HTTP request error with status code (transient/permanent based on status code)
    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    /// Invalid address format (permanent)
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Network configuration error (permanent)
    #[error("Network configuration error: {0}")]
    NetworkConfiguration(String),

    /// Insufficient funds for the transfer or the fee (permanent)
    #[error("Insufficient funds for transaction: {0}")]
    InsufficientFunds(String),

    /// Blockhash not found or expired
    #[error("Blockhash not found or expired: {0}")]
    BlockhashNotFound(String),

    /// Invalid transaction structure or execution (permanent)
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Transaction already processed (permanent - duplicate)
    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),
}

/// How a JSON-RPC error code should be classified.
#[derive(Debug, Clone, Copy)]
enum RpcCodeClass {
    /// Look at the message to tell funds/blockhash issues from other failures.
    SimulationFailure,
    Transient,
    Configuration,
    BlockhashNotFound,
    AlreadyProcessed,
    Invalid,
}

/// Solana JSON-RPC 2.0 server error codes.
const RPC_ERROR_CODES: &[(&str, RpcCodeClass)] = &[
    ("-32002", RpcCodeClass::SimulationFailure),
    ("-32003", RpcCodeClass::Invalid),
    ("-32004", RpcCodeClass::Transient),
    ("-32005", RpcCodeClass::Transient),
    ("-32007", RpcCodeClass::Configuration),
    ("-32008", RpcCodeClass::BlockhashNotFound),
    ("-32009", RpcCodeClass::AlreadyProcessed),
    ("-32010", RpcCodeClass::Configuration),
    ("-32013", RpcCodeClass::Invalid),
    ("-32014", RpcCodeClass::Transient),
    ("-32015", RpcCodeClass::Invalid),
    ("-32016", RpcCodeClass::Transient),
    ("-32602", RpcCodeClass::Invalid),
];

/// Messages that indicate an account could not cover the transfer or fee.
/// `custom program error: 0x1` is the system program's
/// `ResultWithNegativeLamports`.
const INSUFFICIENT_FUNDS_PATTERNS: &[&str] = &[
    "insufficient funds",
    "insufficient lamports",
    "custom program error: 0x1",
];

/// Matches `pattern` in `error_msg` ignoring case and spaces.
fn matches_error_pattern(error_msg: &str, pattern: &str) -> bool {
    let normalized_msg = error_msg.to_lowercase().replace(' ', "");
    let normalized_pattern = pattern.to_lowercase().replace(' ', "");
    normalized_msg.contains(&normalized_pattern)
}

fn mentions_insufficient_funds(error_msg: &str) -> bool {
    INSUFFICIENT_FUNDS_PATTERNS
        .iter()
        .any(|pattern| matches_error_pattern(error_msg, pattern))
}

impl SolanaProviderError {
    /// Determines if this error is transient (the same read may succeed later).
    pub fn is_transient(&self) -> bool {
        match self {
            SolanaProviderError::NetworkError(_)
            | SolanaProviderError::RpcError(_)
            | SolanaProviderError::BlockhashNotFound(_) => true,

            SolanaProviderError::RequestError { status_code, .. } => match *status_code {
                501 | 505 => false,
                500..=599 => true,
                408 | 425 | 429 => true,
                _ => false,
            },

            SolanaProviderError::InsufficientFunds(_)
            | SolanaProviderError::InvalidTransaction(_)
            | SolanaProviderError::AlreadyProcessed(_)
            | SolanaProviderError::InvalidAddress(_)
            | SolanaProviderError::NetworkConfiguration(_) => false,
        }
    }

    /// Whether the failure is at the transport layer rather than a ledger
    /// verdict.
    ///
    /// This does not mean the transaction is absent: a timeout or a 5xx can
    /// arrive after the node already accepted it. Check the signature status
    /// before resubmitting.
    pub fn is_network_level(&self) -> bool {
        matches!(
            self,
            SolanaProviderError::NetworkError(_) | SolanaProviderError::RequestError { .. }
        )
    }

    /// Classifies a Solana RPC client error into the appropriate variant.
    pub fn from_rpc_error(error: ClientError) -> Self {
        match error.kind() {
            ClientErrorKind::Io(_) => SolanaProviderError::NetworkError(error.to_string()),

            ClientErrorKind::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) => SolanaProviderError::RequestError {
                    error: error.to_string(),
                    status_code: status.as_u16(),
                },
                None => SolanaProviderError::NetworkError(error.to_string()),
            },

            ClientErrorKind::RpcError(rpc_err) => {
                Self::from_rpc_response_error(&rpc_err.to_string(), &error.to_string())
            }

            ClientErrorKind::TransactionError(tx_error) => {
                Self::from_transaction_error(tx_error, error.to_string())
            }

            ClientErrorKind::Custom(msg) => Self::from_rpc_response_error(msg, &error.to_string()),

            _ => SolanaProviderError::RpcError(error.to_string()),
        }
    }

    /// Classifies an RPC response error using its JSON-RPC code, falling back
    /// to message patterns for unknown codes.
    fn from_rpc_response_error(rpc_err: &str, full_error: &str) -> Self {
        let class = RPC_ERROR_CODES
            .iter()
            .find(|(code, _)| rpc_err.contains(code))
            .map(|(_, class)| *class);
        let full = full_error.to_string();

        match class {
            Some(RpcCodeClass::SimulationFailure) => {
                if matches_error_pattern(rpc_err, "blockhash not found") {
                    SolanaProviderError::BlockhashNotFound(full)
                } else if mentions_insufficient_funds(rpc_err) {
                    SolanaProviderError::InsufficientFunds(full)
                } else {
                    SolanaProviderError::InvalidTransaction(full)
                }
            }
            Some(RpcCodeClass::Transient) => SolanaProviderError::RpcError(full),
            Some(RpcCodeClass::Configuration) => SolanaProviderError::NetworkConfiguration(full),
            Some(RpcCodeClass::BlockhashNotFound) => SolanaProviderError::BlockhashNotFound(full),
            Some(RpcCodeClass::AlreadyProcessed) => SolanaProviderError::AlreadyProcessed(full),
            Some(RpcCodeClass::Invalid) => SolanaProviderError::InvalidTransaction(full),
            None => {
                if mentions_insufficient_funds(rpc_err) {
                    SolanaProviderError::InsufficientFunds(full)
                } else if matches_error_pattern(rpc_err, "blockhash not found") {
                    SolanaProviderError::BlockhashNotFound(full)
                } else if matches_error_pattern(rpc_err, "already processed") {
                    SolanaProviderError::AlreadyProcessed(full)
                } else {
                    SolanaProviderError::RpcError(full)
                }
            }
        }
    }

    fn from_transaction_error(tx_error: &TransactionError, full_error: String) -> Self {
        match tx_error {
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. } => {
                SolanaProviderError::InsufficientFunds(full_error)
            }
            TransactionError::BlockhashNotFound => {
                SolanaProviderError::BlockhashNotFound(full_error)
            }
            TransactionError::AlreadyProcessed => SolanaProviderError::AlreadyProcessed(full_error),
            TransactionError::SignatureFailure
            | TransactionError::MissingSignatureForFee
            | TransactionError::InvalidAccountForFee
            | TransactionError::AccountNotFound
            | TransactionError::InvalidAccountIndex
            | TransactionError::ProgramAccountNotFound
            | TransactionError::InstructionError(_, _)
            | TransactionError::InvalidWritableAccount
            | TransactionError::TooManyAccountLocks => {
                SolanaProviderError::InvalidTransaction(full_error)
            }
            TransactionError::AccountInUse
            | TransactionError::AccountLoadedTwice
            | TransactionError::ClusterMaintenance => SolanaProviderError::RpcError(full_error),
            _ => SolanaProviderError::RpcError(full_error),
        }
    }
}

impl From<String> for SolanaProviderError {
    fn from(s: String) -> Self {
        SolanaProviderError::RpcError(s)
    }
}
