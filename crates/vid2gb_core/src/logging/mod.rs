//! Logging infrastructure for vid2gb.
//!
//! This module provides:
//! - A per-run logger with console (tracing), optional file and callback output
//! - Consistent message prefixes for phases, commands and outcomes
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use vid2gb_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("clip.mp4", LogConfig::default(), None, None).unwrap();
//!
//! logger.phase("[1/5] Extracting frames");
//! logger.command("ffmpeg -i clip.mp4 ...");
//! logger.warn("Continuing without audio");
//! logger.success("ROM built");
//! ```

mod run_logger;
mod types;

pub use run_logger::RunLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .try_init();
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
