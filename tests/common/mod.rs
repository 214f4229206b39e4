//! Scripted cmux server for integration tests.
//!
//! Binds a real Unix socket on a std thread. Every command line it receives
//! is recorded and handed to a responder, which returns the bytes to write
//! back as a list of delayed chunks. An empty list means "stay silent".

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tempfile::TempDir;

/// One write from the server: delay before writing, then the bytes.
pub type Chunk = (u64, Vec<u8>);

/// Global counter for unique socket paths across tests
static TEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Creates a temp directory under /tmp, keeping socket paths short.
pub fn create_temp_dir() -> TempDir {
    TempDir::new_in("/tmp").expect("Failed to create temp directory in /tmp")
}

/// Creates a unique socket path for test isolation
pub fn unique_socket_path(temp_dir: &TempDir, prefix: &str) -> PathBuf {
    let count = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    temp_dir.path().join(format!("{}_{}.sock", prefix, count))
}

/// A single newline-terminated reply.
pub fn reply(text: &str) -> Vec<Chunk> {
    vec![(0, format!("{text}\n").into_bytes())]
}

/// No reply at all.
pub fn silence() -> Vec<Chunk> {
    Vec::new()
}

type Responder = dyn Fn(&str) -> Vec<Chunk> + Send + Sync;

/// Server handle. Stops accepting when dropped.
pub struct FakeServer {
    path: PathBuf,
    received: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeServer {
    /// Binds `path` and starts answering with `responder`.
    pub fn start<F>(path: &Path, responder: F) -> Self
    where
        F: Fn(&str) -> Vec<Chunk> + Send + Sync + 'static,
    {
        let listener = UnixListener::bind(path).expect("Failed to bind fake server");
        let received = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let responder: Arc<Responder> = Arc::new(responder);

        let handle = {
            let received = Arc::clone(&received);
            let connections = Arc::clone(&connections);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    if stop.load(Ordering::SeqCst) {
                        break;
                    }
                    let Ok(stream) = stream else { continue };
                    connections.fetch_add(1, Ordering::SeqCst);
                    let received = Arc::clone(&received);
                    let responder = Arc::clone(&responder);
                    thread::spawn(move || serve(stream, responder, received));
                }
            })
        };

        Self {
            path: path.to_path_buf(),
            received,
            connections,
            stop,
            handle: Some(handle),
        }
    }

    /// Answers every command with `PONG`-style fixed text.
    pub fn replying(path: &Path, text: &'static str) -> Self {
        Self::start(path, move |_| reply(text))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Command lines received so far, without their newline.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().expect("received lock").clone()
    }

    /// Number of accepted connections.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        // Wake the accept loop so it sees the flag.
        let _ = UnixStream::connect(&self.path);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        let _ = std::fs::remove_file(&self.path);
    }
}

fn serve(stream: UnixStream, responder: Arc<Responder>, received: Arc<Mutex<Vec<String>>>) {
    let Ok(read_half) = stream.try_clone() else {
        return;
    };
    let mut writer = stream;
    for line in BufReader::new(read_half).lines() {
        let Ok(line) = line else { return };
        received.lock().expect("received lock").push(line.clone());
        for (delay_ms, bytes) in responder(&line) {
            thread::sleep(Duration::from_millis(delay_ms));
            if writer.write_all(&bytes).is_err() {
                return;
            }
        }
    }
}

/// Reverses the client's option quoting.
pub fn unquote(token: &str) -> String {
    cmux_client::commands::unquote_option_value(token)
}
