//! Liveness probing for candidate sockets.
//!
//! A probe is a throwaway connect: it succeeds as soon as the kernel accepts
//! the connection and the socket is dropped immediately, so the server only
//! ever sees an open-then-EOF peer.

use std::io;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Timing for a liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Upper bound for a single connect attempt.
    pub attempt_timeout: Duration,
    /// Number of attempts before giving up (at least one is always made).
    pub attempts: u32,
    /// Pause after a failed attempt.
    pub backoff: Duration,
}

impl ProbePolicy {
    /// Policy for explicit candidates (tagged, override, marker file, defaults).
    pub const STANDARD: ProbePolicy = ProbePolicy {
        attempt_timeout: Duration::from_millis(150),
        attempts: 4,
        backoff: Duration::from_millis(50),
    };

    /// Cheaper policy for sockets found by globbing the temp directory.
    pub const DISCOVERY: ProbePolicy = ProbePolicy {
        attempt_timeout: Duration::from_millis(100),
        attempts: 2,
        backoff: Duration::from_millis(50),
    };
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Returns `true` if something is accepting connections at `path`.
///
/// Failures of any kind count as "not live" and are only traced.
pub fn is_live(path: &Path, policy: ProbePolicy) -> bool {
    for attempt in 1..=policy.attempts.max(1) {
        match connect_within(path, policy.attempt_timeout) {
            Ok(()) => {
                tracing::trace!("Probe {} succeeded for {:?}", attempt, path);
                return true;
            }
            Err(e) => {
                tracing::trace!("Probe {} failed for {:?}: {}", attempt, path, e);
                thread::sleep(policy.backoff);
            }
        }
    }
    false
}

/// Connects on a helper thread so a wedged listener cannot stall the caller
/// past `timeout`. The stream is dropped on the helper thread either way.
fn connect_within(path: &Path, timeout: Duration) -> io::Result<()> {
    let (tx, rx) = mpsc::channel();
    let target = path.to_path_buf();
    thread::Builder::new()
        .name("cmux-probe".to_string())
        .spawn(move || {
            let _ = tx.send(UnixStream::connect(&target).map(drop));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "probe connect timed out",
        )),
    }
}
