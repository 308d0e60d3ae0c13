//! Logging utilities
//!
//! Provides logging setup for the binaries.

/// Initialize env_logger at `info` unless `RUST_LOG` says otherwise.
pub fn setup_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
