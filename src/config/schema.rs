//! TOML configuration schema types for the cmux client.
//!
//! All structs derive `Deserialize` and `Serialize` with defaults via
//! `#[serde(default)]`, so every section and field is optional.
//!
//! Duration fields use human-readable strings (e.g. `"2s"`, `"100ms"`)
//! parsed by the `humantime` crate in [`TimeoutConfig::to_timeouts`].
//!
//! ```toml
//! [socket]
//! tag = "my-branch"
//!
//! [timeouts]
//! connect = "2s"
//! io = "5s"
//! command = "5s"
//! quiescence = "100ms"
//!
//! [log]
//! level = "warn"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::client::Timeouts;
use crate::config::error::ConfigError;

/// Everything `config.toml` can hold.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Socket resolution hints.
    pub socket: SocketConfig,
    /// Connect and command timeouts.
    pub timeouts: TimeoutConfig,
    /// Logging settings for the CLI.
    pub log: LogConfig,
}

// ---------------------------------------------------------------------------
// Socket
// ---------------------------------------------------------------------------

/// Socket hints from the `[socket]` section.
///
/// Environment variables take precedence over every field here.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SocketConfig {
    /// Explicit socket path (like `CMUX_SOCKET_PATH`). Tilde is expanded.
    pub path: Option<String>,
    /// Instance tag (like `CMUX_TAG`).
    pub tag: Option<String>,
    /// Bundle identifier (like `CMUX_BUNDLE_ID`).
    pub bundle_id: Option<String>,
    /// Directory holding the sockets. Default: `/tmp`.
    pub temp_dir: Option<String>,
}

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

/// Durations from the `[timeouts]` section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Overall budget for waiting on the socket and connecting.
    pub connect: String,
    /// Per-read and per-write socket timeout.
    pub io: String,
    /// Hard ceiling for a command that has produced no complete line.
    pub command: String,
    /// Silence that ends a response once a line has arrived.
    pub quiescence: String,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect: "2s".to_string(),
            io: "5s".to_string(),
            command: "5s".to_string(),
            quiescence: "100ms".to_string(),
        }
    }
}

impl TimeoutConfig {
    /// Parses every field into runtime [`Timeouts`].
    pub fn to_timeouts(&self) -> Result<Timeouts, ConfigError> {
        Ok(Timeouts {
            connect: parse_duration("timeouts.connect", &self.connect)?,
            io: parse_duration("timeouts.io", &self.io)?,
            command: parse_duration("timeouts.command", &self.command)?,
            quiescence: parse_duration("timeouts.quiescence", &self.quiescence)?,
        })
    }
}

/// Parses a non-zero human-readable duration.
fn parse_duration(field: &str, value: &str) -> Result<Duration, ConfigError> {
    let duration = humantime::parse_duration(value.trim()).map_err(|e| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: format!("{value:?}: {e}"),
        }
    })?;
    if duration.is_zero() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(duration)
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Settings from the `[log]` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Verbosity used when `CMUX_LOG` is unset.
    pub level: LogLevel,
}

/// Default verbosity, spelled in lowercase in TOML.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LogLevel {
    /// Only errors.
    Error,
    /// Errors and warnings (default).
    #[default]
    Warn,
    /// Informational messages.
    Info,
    /// Debug-level detail.
    Debug,
    /// Full trace output.
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
