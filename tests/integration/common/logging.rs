//! Test logging initialization
//!
//! Uses `std::sync::Once` so that initialization only happens once, even if
//! called from multiple tests.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing subscriber for integration tests.
///
/// Loads `.env.integration` when present (RPC URL, program id, finality tier).
/// Filtering is controlled by `RUST_LOG`; default is `info`.
pub fn init_test_logging() {
    INIT.call_once(|| {
        // In CI the variables are set directly
        let _ = dotenvy::from_filename(".env.integration");
        let default_filter = "info";

        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            )
            // Real-time output instead of the buffered test writer
            .with_target(false)
            .with_ansi(false)
            .try_init();
    });
}
