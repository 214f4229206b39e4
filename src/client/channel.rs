//! Request/response exchange over an open [`Connection`].
//!
//! One command goes out as a single newline-terminated line. The response is
//! read until the [`Framing`] says it is complete; with [`Quiescence`] that
//! means at least one newline has arrived and the socket then stays silent for
//! `Timeouts::quiescence`. A response that never produces a newline fails
//! once `Timeouts::command` has elapsed.
//!
//! [`Quiescence`]: crate::client::Quiescence

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::time::{Duration, Instant};

use crate::client::{Connection, Framing, Timeouts};
use crate::error::{Error, Result};

const READ_CHUNK: usize = 8192;

/// A zero read timeout is rejected by the OS, so waits never go below this.
const MIN_READ_WAIT: Duration = Duration::from_millis(1);

/// Anything that can run one textual command and return the response text.
///
/// Implemented by [`crate::Client`]; the typed operations in
/// [`crate::Commands`] are built on top of it.
pub trait CommandChannel {
    /// Sends `command` and returns the response with its trailing delimiter
    /// removed.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`], [`Error::CommandTimedOut`], or [`Error::Socket`].
    fn execute(&mut self, command: &str) -> Result<String>;
}

/// Runs one command on `conn`.
///
/// `command` must not contain raw newlines; the facade escapes free text
/// before it gets here.
///
/// # Errors
///
/// - [`Error::NotConnected`] if `conn` has been closed.
/// - [`Error::CommandTimedOut`] if the write times out, or no complete
///   response arrives within `timeouts.command`.
/// - [`Error::Socket`] for any other I/O failure, including an abort.
pub fn execute(
    conn: &mut Connection,
    command: &str,
    framing: &dyn Framing,
    timeouts: &Timeouts,
) -> Result<String> {
    let started = Instant::now();
    let name = command.split_whitespace().next().unwrap_or("");

    let mut buf = std::mem::take(&mut conn.carry_over);
    let stream = conn.stream_mut()?;

    let mut line = String::with_capacity(command.len() + 1);
    line.push_str(command);
    line.push('\n');
    stream.write_all(line.as_bytes()).map_err(|e| {
        if is_timeout(&e) {
            Error::CommandTimedOut {
                elapsed: started.elapsed(),
            }
        } else {
            Error::Socket(e)
        }
    })?;

    let outcome = read_response(stream, &mut buf, framing, timeouts, started, name);
    // Per-read waits shrink toward the ceiling; put the configured timeout
    // back on every exit.
    let restored = stream.set_read_timeout(Some(timeouts.io));
    let (leftover, peer_closed) = outcome?;
    restored?;

    if peer_closed && conn.was_aborted() {
        return Err(Error::Socket(io::Error::new(
            io::ErrorKind::ConnectionAborted,
            "connection closed while waiting for a response",
        )));
    }
    conn.carry_over = leftover;

    tracing::trace!(
        command = name,
        elapsed_ms = started.elapsed().as_micros() as f64 / 1000.0,
        bytes = buf.len(),
        peer_closed,
        "Command completed"
    );

    Ok(framing.finish(&buf))
}

/// Reads into `buf` until the response is complete.
///
/// Returns the bytes past the framing boundary and whether the peer closed.
fn read_response(
    stream: &mut UnixStream,
    buf: &mut Vec<u8>,
    framing: &dyn Framing,
    timeouts: &Timeouts,
    started: Instant,
    name: &str,
) -> Result<(Vec<u8>, bool)> {
    let quiescent = framing.ends_on_quiescence();
    let mut saw_newline = buf.contains(&b'\n');
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        if let Some(end) = framing.boundary(buf) {
            return Ok((buf.split_off(end), false));
        }

        let wait = if saw_newline && quiescent {
            timeouts.quiescence
        } else {
            let remaining = timeouts.command.saturating_sub(started.elapsed());
            timeouts.io.min(remaining).max(MIN_READ_WAIT)
        };
        stream.set_read_timeout(Some(wait))?;

        match stream.read(&mut chunk) {
            Ok(0) => return Ok((Vec::new(), true)),
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                saw_newline = saw_newline || chunk[..n].contains(&b'\n');
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) => {
                if saw_newline && quiescent {
                    return Ok((Vec::new(), false));
                }
                let elapsed = started.elapsed();
                if elapsed >= timeouts.command {
                    tracing::debug!("Command {:?} timed out after {:?}", name, elapsed);
                    return Err(Error::CommandTimedOut { elapsed });
                }
            }
            Err(e) => return Err(Error::Socket(e)),
        }
    }
}

/// Read/write timeouts surface as `WouldBlock` on Unix and `TimedOut` elsewhere.
fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
