//! Error type shared by every client operation.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by the socket client.
///
/// Internal retries (liveness probes, connect backoff) never surface here;
/// only the final outcome does.
#[derive(Error, Debug)]
pub enum Error {
    /// The socket path never appeared within the connect timeout.
    #[error("Socket not found at {}. Is cmux running?", path.display())]
    SocketNotFound {
        /// Path that was polled.
        path: PathBuf,
    },

    /// A non-transient connect error, or transient errors until the deadline.
    #[error("Failed to connect to {}: {source}", path.display())]
    ConnectFailed {
        /// Path that was dialed.
        path: PathBuf,
        /// Last OS-level error.
        #[source]
        source: std::io::Error,
    },

    /// A command was issued on a client with no open connection.
    #[error("Not connected")]
    NotConnected,

    /// No newline-terminated response arrived before the hard ceiling.
    #[error("Command timed out after {}ms", elapsed.as_millis())]
    CommandTimedOut {
        /// Time spent waiting for the response.
        elapsed: Duration,
    },

    /// Any other I/O failure while sending or receiving.
    #[error("Socket error: {0}")]
    Socket(#[from] std::io::Error),

    /// The server answered, but not with the success marker.
    #[error("{0}")]
    Protocol(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
