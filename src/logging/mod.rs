//! ## Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - LOG_LEVEL: level or `EnvFilter` directive ("trace", "debug", "info", "warn", "error",
//!   or e.g. "sol_transfer_harness=debug"); default is "info"
//! - LOG_FORMAT: "compact" (default) or "json"

use std::env;
use strum::Display;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::constants::DEFAULT_LOG_LEVEL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Unknown values fall back to `Compact`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Builds the filter from a LOG_LEVEL value, falling back to the default
/// level when the directive does not parse.
fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level.trim().to_lowercase())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global tracing subscriber. Calling it again is a no-op.
pub fn setup_logging() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
    let log_format = LogFormat::parse(&env::var("LOG_FORMAT").unwrap_or_default());

    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(&log_level));
    let installed = match log_format {
        LogFormat::Json => builder.json().with_current_span(false).try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
    };

    if installed.is_ok() {
        info!(level = %log_level, format = %log_format, "Logging is successfully configured");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Compact);
        assert_eq!(LogFormat::parse(""), LogFormat::Compact);
    }

    #[test]
    fn test_build_filter_accepts_levels_and_directives() {
        assert_eq!(build_filter("debug").to_string(), "debug");
        assert_eq!(
            build_filter("sol_transfer_harness=trace").to_string(),
            "sol_transfer_harness=trace"
        );
    }

    #[test]
    fn test_build_filter_falls_back_on_garbage() {
        assert_eq!(build_filter("chatty=loud").to_string(), "info");
    }

    #[test]
    fn test_setup_logging_twice_does_not_panic() {
        setup_logging();
        setup_logging();
    }
}
