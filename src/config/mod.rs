//! Harness configuration loaded from environment variables.
//!
//! Every variable has a default; a variable that is set but cannot be parsed
//! is reported as a `ConfigError` instead of falling back to the default.

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{env, str::FromStr, time::Duration};
use strum::Display;
use thiserror::Error;

mod rpc_config;
pub use rpc_config::*;

use crate::{
    constants::{
        DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_FEE_UPPER_BOUND_LAMPORTS,
        DEFAULT_RECEIVER_FUNDING_LAMPORTS, DEFAULT_RPC_TIMEOUT_SECONDS,
        DEFAULT_SENDER_FUNDING_LAMPORTS, DEFAULT_SOLANA_RPC_URL, DEFAULT_TRANSFER_LAMPORTS,
    },
    models::{FinalityTier, TransferProgram},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Which ledger the harness talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LedgerMode {
    /// A cluster reached over JSON-RPC.
    #[default]
    Rpc,
    /// The in-process ledger.
    Memory,
}

impl FromStr for LedgerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rpc" => Ok(LedgerMode::Rpc),
            "memory" | "in-memory" => Ok(LedgerMode::Memory),
            other => Err(format!("unknown ledger mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub rpc: RpcConfig,
    pub ledger_mode: LedgerMode,
    pub transfer_program: TransferProgram,
    pub finality_tier: FinalityTier,
    pub fee_upper_bound_lamports: u64,
    pub confirmation_poll_interval: Duration,
    pub sender_funding_lamports: u64,
    pub receiver_funding_lamports: u64,
    pub transfer_lamports: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            ledger_mode: LedgerMode::default(),
            transfer_program: TransferProgram::default(),
            finality_tier: FinalityTier::default(),
            fee_upper_bound_lamports: DEFAULT_FEE_UPPER_BOUND_LAMPORTS,
            confirmation_poll_interval: Duration::from_millis(
                DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
            ),
            sender_funding_lamports: DEFAULT_SENDER_FUNDING_LAMPORTS,
            receiver_funding_lamports: DEFAULT_RECEIVER_FUNDING_LAMPORTS,
            transfer_lamports: DEFAULT_TRANSFER_LAMPORTS,
        }
    }
}

/// Reads `name` and parses it, returning `default` when the variable is unset.
fn env_parse<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(name, &value, e)),
        Err(_) => Ok(default),
    }
}

fn parse_transfer_program() -> Result<TransferProgram, ConfigError> {
    let kind = env::var("TRANSFER_PROGRAM").unwrap_or_else(|_| "anchor".to_string());
    match kind.trim().to_lowercase().as_str() {
        "system" => Ok(TransferProgram::System),
        "anchor" => match env::var("TRANSFER_PROGRAM_ID") {
            Ok(id) => Pubkey::from_str(id.trim())
                .map(|program_id| TransferProgram::Anchor { program_id })
                .map_err(|e| ConfigError::invalid("TRANSFER_PROGRAM_ID", &id, e)),
            Err(_) => Ok(TransferProgram::default()),
        },
        _ => Err(ConfigError::invalid(
            "TRANSFER_PROGRAM",
            &kind,
            "expected 'anchor' or 'system'",
        )),
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("SOLANA_RPC_URL").unwrap_or_else(|_| DEFAULT_SOLANA_RPC_URL.to_string());
        let timeout_seconds = env_parse("RPC_TIMEOUT_SECONDS", DEFAULT_RPC_TIMEOUT_SECONDS)?;
        let poll_interval_ms = env_parse(
            "CONFIRMATION_POLL_INTERVAL_MS",
            DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
        )?;

        let transfer_lamports = env_parse("TRANSFER_LAMPORTS", DEFAULT_TRANSFER_LAMPORTS)?;
        if transfer_lamports == 0 {
            return Err(ConfigError::invalid(
                "TRANSFER_LAMPORTS",
                "0",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            rpc: RpcConfig {
                url,
                timeout_seconds,
            },
            ledger_mode: env_parse("LEDGER_MODE", LedgerMode::default())?,
            transfer_program: parse_transfer_program()?,
            finality_tier: env_parse("FINALITY_TIER", FinalityTier::default())?,
            fee_upper_bound_lamports: env_parse(
                "FEE_UPPER_BOUND_LAMPORTS",
                DEFAULT_FEE_UPPER_BOUND_LAMPORTS,
            )?,
            confirmation_poll_interval: Duration::from_millis(poll_interval_ms),
            sender_funding_lamports: env_parse(
                "SENDER_FUNDING_LAMPORTS",
                DEFAULT_SENDER_FUNDING_LAMPORTS,
            )?,
            receiver_funding_lamports: env_parse(
                "RECEIVER_FUNDING_LAMPORTS",
                DEFAULT_RECEIVER_FUNDING_LAMPORTS,
            )?,
            transfer_lamports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 11] = [
        "SOLANA_RPC_URL",
        "RPC_TIMEOUT_SECONDS",
        "LEDGER_MODE",
        "TRANSFER_PROGRAM",
        "TRANSFER_PROGRAM_ID",
        "FINALITY_TIER",
        "FEE_UPPER_BOUND_LAMPORTS",
        "CONFIRMATION_POLL_INTERVAL_MS",
        "SENDER_FUNDING_LAMPORTS",
        "RECEIVER_FUNDING_LAMPORTS",
        "TRANSFER_LAMPORTS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_unset() {
        clear_env();
        let config = HarnessConfig::from_env().unwrap();

        assert_eq!(config.rpc.url, DEFAULT_SOLANA_RPC_URL);
        assert_eq!(config.rpc.timeout_seconds, 30);
        assert_eq!(config.ledger_mode, LedgerMode::Rpc);
        assert_eq!(config.transfer_program, TransferProgram::default());
        assert_eq!(config.finality_tier, FinalityTier::Confirmed);
        assert_eq!(config.fee_upper_bound_lamports, 5_000);
        assert_eq!(config.confirmation_poll_interval, Duration::from_millis(500));
        assert_eq!(config.sender_funding_lamports, 10_000_000_000);
        assert_eq!(config.receiver_funding_lamports, 1_000_000_000);
        assert_eq!(config.transfer_lamports, 2_000_000_000);
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        env::set_var("SOLANA_RPC_URL", "https://api.devnet.solana.com");
        env::set_var("LEDGER_MODE", "memory");
        env::set_var("TRANSFER_PROGRAM", "system");
        env::set_var("FINALITY_TIER", "finalized");
        env::set_var("FEE_UPPER_BOUND_LAMPORTS", "10000");
        env::set_var("CONFIRMATION_POLL_INTERVAL_MS", "50");

        let config = HarnessConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.rpc.url, "https://api.devnet.solana.com");
        assert_eq!(config.ledger_mode, LedgerMode::Memory);
        assert_eq!(config.transfer_program, TransferProgram::System);
        assert_eq!(config.finality_tier, FinalityTier::Finalized);
        assert_eq!(config.fee_upper_bound_lamports, 10_000);
        assert_eq!(config.confirmation_poll_interval, Duration::from_millis(50));
    }

    #[test]
    #[serial]
    fn test_custom_program_id() {
        clear_env();
        let program_id = Pubkey::new_unique();
        env::set_var("TRANSFER_PROGRAM_ID", program_id.to_string());

        let config = HarnessConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.transfer_program, TransferProgram::Anchor { program_id });
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_errors() {
        let cases = [
            ("RPC_TIMEOUT_SECONDS", "soon"),
            ("LEDGER_MODE", "carrier-pigeon"),
            ("TRANSFER_PROGRAM", "token"),
            ("TRANSFER_PROGRAM_ID", "not-a-pubkey"),
            ("FINALITY_TIER", "processed"),
            ("FEE_UPPER_BOUND_LAMPORTS", "-1"),
            ("TRANSFER_LAMPORTS", "0"),
        ];
        for (name, value) in cases {
            clear_env();
            env::set_var(name, value);
            let result = HarnessConfig::from_env();
            clear_env();

            match result {
                Err(ConfigError::InvalidValue { name: reported, .. }) => {
                    assert_eq!(reported, name)
                }
                Ok(_) => panic!("{name}={value} should be rejected"),
            }
        }
    }
}
