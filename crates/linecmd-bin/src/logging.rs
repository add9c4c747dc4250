//! Logging initialization for the daemon.

use tracing_subscriber::EnvFilter;

/// Initialize tracing with a compact stderr formatter.
///
/// The filter comes from `RUST_LOG` when set, otherwise from the provided
/// default level.
pub fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
