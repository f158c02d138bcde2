//! Tracing subscriber setup shared by binaries and hosting services.

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install a fmt subscriber. `RUST_LOG` wins over `LogConfig::default_filter`.
///
/// Uses `try_init`, so a second call (or a host that already installed a
/// subscriber) is a no-op. Returns whether this call installed it.
pub fn init_tracing(log: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
