//! Subscriber setup for binaries embedding the pipeline.
//!
//! The library only emits `tracing` events; without a subscriber they are
//! discarded and nothing else changes.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Returns `false` if a global subscriber was already set.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
