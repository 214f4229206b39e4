//! Failures while reading `config.toml`.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be produced.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but reading it failed.
    #[error("Cannot read config file {path}")]
    ReadError {
        /// File being read.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },

    /// Not valid TOML, or a field has the wrong type.
    #[error("Config syntax error in {path}:{line}:{column}: {message}")]
    ParseError {
        /// File that failed to parse.
        path: PathBuf,
        /// One-based line, or 0 when toml gave no span.
        line: usize,
        /// One-based column, or 0 when toml gave no span.
        column: usize,
        /// Message from the toml parser.
        message: String,
    },

    /// A file named with `--config` does not exist.
    #[error("Config file {path} does not exist")]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// A value parsed as TOML but is not meaningful for its field.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        /// Dotted field name, e.g. `timeouts.connect`.
        field: String,
        /// Why the value was rejected.
        message: String,
    },
}
