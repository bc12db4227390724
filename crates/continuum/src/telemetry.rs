//! Logging initialization for the `continuum` tool.
//!
//! Uses a plain `tracing-subscriber` `fmt` layer filtered by `RUST_LOG`, or by
//! the configured level when `RUST_LOG` is unset. Logs go to stderr so that
//! command output on stdout can be piped.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Call this once at startup, before any `tracing` events are emitted.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
