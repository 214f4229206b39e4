//! Logging initialization for the `cmux` binary.
//!
//! Configures the `tracing` subscriber with level filtering via the `CMUX_LOG`
//! environment variable. Falls back to the `[log] level` from the config file
//! (default `warn`) when the variable is unset or invalid.
//!
//! # Usage
//!
//! ```bash
//! # Resolution steps and connect retries
//! CMUX_LOG=debug cmux ping
//!
//! # Per-command timing
//! CMUX_LOG=cmux_client=trace cmux exec list_tabs
//! ```
//!
//! The library only emits events; installing a subscriber is up to the
//! embedding application.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::schema::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "CMUX_LOG";

/// Builds the filter from `CMUX_LOG`, falling back to `default`.
pub fn filter(default: LogLevel) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default.as_directive()))
}

/// Initialize the tracing subscriber, writing to stderr.
///
/// Does nothing if a global subscriber is already installed, so embedding
/// code can install its own first.
pub fn init(default: LogLevel) {
    let _ = fmt()
        .with_env_filter(filter(default))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
