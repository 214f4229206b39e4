//! Socket connection with bounded retry.
//!
//! The server may still be starting when a client connects: the socket file
//! may not exist yet, or exist while nothing accepts on it. [`Connection::connect`]
//! waits out both conditions inside one overall deadline and fails fast on
//! anything else.

use std::io;
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use crate::client::Timeouts;
use crate::error::{Error, Result};

/// Backoff configuration for path polling and connect retries.
const INITIAL_BACKOFF_MS: u64 = 10;
const MAX_BACKOFF_MS: u64 = 100;

/// One live socket plus the bytes read past the previous response.
///
/// At most one command may be in flight per connection; the carry-over
/// buffer belongs to whichever command runs next.
#[derive(Debug)]
pub struct Connection {
    path: PathBuf,
    stream: Option<UnixStream>,
    pub(crate) carry_over: Vec<u8>,
    aborted: Arc<AtomicBool>,
}

impl Connection {
    /// Connects to `path`, waiting up to `timeouts.connect` for the server.
    ///
    /// # Errors
    ///
    /// - [`Error::SocketNotFound`] if the path never appears.
    /// - [`Error::ConnectFailed`] on a non-transient connect error, or when
    ///   refusals continue past the deadline.
    /// - [`Error::Socket`] if the socket timeouts cannot be applied.
    pub fn connect(path: &Path, timeouts: &Timeouts) -> Result<Self> {
        let start = Instant::now();
        let mut attempt = 0;

        while !path.exists() {
            let elapsed = start.elapsed();
            if elapsed >= timeouts.connect {
                return Err(Error::SocketNotFound {
                    path: path.to_path_buf(),
                });
            }
            sleep(calculate_backoff(attempt).min(timeouts.connect - elapsed));
            attempt += 1;
        }

        attempt = 0;
        loop {
            match UnixStream::connect(path) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeouts.io))?;
                    stream.set_write_timeout(Some(timeouts.io))?;
                    tracing::info!(
                        "Connected to {:?} after {} retries",
                        path,
                        attempt
                    );
                    return Ok(Self::from_stream(path, stream));
                }
                Err(e) if is_transient(&e) && start.elapsed() < timeouts.connect => {
                    let delay = calculate_backoff(attempt);
                    tracing::debug!(
                        "Connection attempt {} to {:?} failed: {}, retrying in {:?}",
                        attempt + 1,
                        path,
                        e,
                        delay
                    );
                    sleep(delay);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::debug!("Connection to {:?} failed: {}", path, e);
                    return Err(Error::ConnectFailed {
                        path: path.to_path_buf(),
                        source: e,
                    });
                }
            }
        }
    }

    /// Wraps an already-connected stream.
    pub fn from_stream(path: impl Into<PathBuf>, stream: UnixStream) -> Self {
        Self {
            path: path.into(),
            stream: Some(stream),
            carry_over: Vec::new(),
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Path this connection was opened against.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` until [`Connection::close`] is called.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Releases the socket. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            tracing::debug!("Closed connection to {:?}", self.path);
        }
        self.carry_over.clear();
    }

    /// Handle that can tear the socket down from another thread.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] if the connection is closed, or
    /// [`Error::Socket`] if the descriptor cannot be duplicated.
    pub fn abort_handle(&self) -> Result<AbortHandle> {
        let stream = self.stream.as_ref().ok_or(Error::NotConnected)?;
        Ok(AbortHandle {
            stream: stream.try_clone()?,
            aborted: Arc::clone(&self.aborted),
        })
    }

    pub(crate) fn stream_mut(&mut self) -> Result<&mut UnixStream> {
        self.stream.as_mut().ok_or(Error::NotConnected)
    }

    pub(crate) fn was_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Cancels an in-flight command by shutting the shared socket down.
///
/// The blocked read returns promptly and the command fails with
/// [`Error::Socket`]. The connection is unusable afterwards.
#[derive(Debug)]
pub struct AbortHandle {
    stream: UnixStream,
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    /// Shuts down both directions of the socket.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

/// Errors that mean "server not accepting yet" rather than "cannot connect".
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
    )
}

/// Calculates the backoff delay for a given attempt number.
///
/// Exponential from 10ms, capped at 100ms so a server that comes up late is
/// noticed quickly.
fn calculate_backoff(attempt: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(1 << attempt.min(16));
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}
