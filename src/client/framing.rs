//! Response framing strategies.
//!
//! The wire protocol has no length prefix and no end-of-response marker, so
//! the reader has to decide when a response is complete. [`Quiescence`] is
//! what the server speaks today: once a full line has arrived, a short
//! silence ends the response. [`Sentinel`] ends a response at an explicit
//! terminator line instead, for servers that emit one.

use std::fmt;

/// Decides where a response ends.
pub trait Framing: fmt::Debug + Send + Sync {
    /// Offset just past the end of the response, if `buf` already holds a
    /// complete one. Bytes past the offset are kept for the next command.
    fn boundary(&self, buf: &[u8]) -> Option<usize>;

    /// Whether silence after the first newline completes the response.
    fn ends_on_quiescence(&self) -> bool;

    /// Turns the raw response bytes into response text.
    fn finish(&self, response: &[u8]) -> String;
}

/// Ends a response after a quiet period following at least one newline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quiescence;

impl Framing for Quiescence {
    fn boundary(&self, _buf: &[u8]) -> Option<usize> {
        None
    }

    fn ends_on_quiescence(&self) -> bool {
        true
    }

    fn finish(&self, response: &[u8]) -> String {
        String::from_utf8_lossy(strip_one_newline(response)).into_owned()
    }
}

/// Ends a response at a line consisting solely of `terminator`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    line: Vec<u8>,
}

impl Sentinel {
    /// Creates a framing that stops at `terminator` on a line of its own.
    pub fn new(terminator: &str) -> Self {
        let mut line = terminator.as_bytes().to_vec();
        line.push(b'\n');
        Self { line }
    }
}

impl Framing for Sentinel {
    fn boundary(&self, buf: &[u8]) -> Option<usize> {
        if buf.starts_with(&self.line) {
            return Some(self.line.len());
        }
        buf.windows(self.line.len() + 1)
            .position(|w| w[0] == b'\n' && w[1..] == self.line[..])
            .map(|pos| pos + 1 + self.line.len())
    }

    fn ends_on_quiescence(&self) -> bool {
        false
    }

    fn finish(&self, response: &[u8]) -> String {
        let body = response.strip_suffix(&self.line[..]).unwrap_or(response);
        String::from_utf8_lossy(strip_one_newline(body)).into_owned()
    }
}

/// Removes exactly one trailing `\n`: the delimiter, not data.
fn strip_one_newline(bytes: &[u8]) -> &[u8] {
    bytes.strip_suffix(b"\n").unwrap_or(bytes)
}
