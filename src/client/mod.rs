//! Client for the cmux control socket.
//!
//! A [`Client`] resolves its socket path once, at construction, and then
//! moves between two states: disconnected and connected. It can be
//! connected, closed, and connected again any number of times.
//!
//! # Usage
//!
//! ```no_run
//! use cmux_client::{Client, Commands};
//!
//! # fn example() -> cmux_client::Result<()> {
//! let mut client = Client::from_env();
//! client.connect()?;
//! client.send_line("echo hello")?;
//! for tab in client.list_tabs()? {
//!     println!("{} {} {}", tab.index, tab.id, tab.title);
//! }
//! client.close();
//! # Ok(())
//! # }
//! ```

mod channel;
mod connection;
mod framing;

pub use channel::{execute, CommandChannel};
pub use connection::{AbortHandle, Connection};
pub use framing::{Framing, Quiescence, Sentinel};

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::locator::SocketLocator;

/// Time limits for connecting and for each command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Overall budget for the socket to appear and accept a connection.
    pub connect: Duration,
    /// Socket read/write timeout.
    pub io: Duration,
    /// Hard ceiling for a response that has not produced a newline.
    pub command: Duration,
    /// Silence that completes a response once a newline has arrived.
    pub quiescence: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(2),
            io: Duration::from_secs(5),
            command: Duration::from_secs(5),
            quiescence: Duration::from_millis(100),
        }
    }
}

/// Connection owner for one cmux socket.
///
/// Commands are strictly sequential; a client is not meant to be shared
/// between threads without external locking.
#[derive(Debug)]
pub struct Client {
    socket_path: PathBuf,
    timeouts: Timeouts,
    framing: Box<dyn Framing>,
    connection: Option<Connection>,
}

impl Client {
    /// Creates a client for an explicit socket path.
    pub fn at(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeouts: Timeouts::default(),
            framing: Box::new(Quiescence),
            connection: None,
        }
    }

    /// Creates a client for the socket `locator` resolves to.
    pub fn with_locator(locator: &SocketLocator) -> Self {
        Self::at(locator.resolve())
    }

    /// Creates a client for the socket the environment points at.
    pub fn from_env() -> Self {
        Self::with_locator(&SocketLocator::from_env())
    }

    /// Replaces the default timeouts.
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Replaces the default [`Quiescence`] framing.
    pub fn with_framing(mut self, framing: impl Framing + 'static) -> Self {
        self.framing = Box::new(framing);
        self
    }

    /// The resolved socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// The active timeouts.
    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Opens the connection. Does nothing if already connected.
    ///
    /// # Errors
    ///
    /// See [`Connection::connect`].
    pub fn connect(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }
        self.connection = Some(Connection::connect(&self.socket_path, &self.timeouts)?);
        Ok(())
    }

    /// Drops the connection, if any.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.close();
        }
    }

    /// Returns `true` while a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Handle for cancelling the command currently in flight.
    ///
    /// # Errors
    ///
    /// [`Error::NotConnected`] when no connection is open.
    pub fn abort_handle(&self) -> Result<AbortHandle> {
        self.connection
            .as_ref()
            .ok_or(Error::NotConnected)?
            .abort_handle()
    }
}

impl CommandChannel for Client {
    fn execute(&mut self, command: &str) -> Result<String> {
        let conn = self.connection.as_mut().ok_or(Error::NotConnected)?;
        execute(conn, command, self.framing.as_ref(), &self.timeouts)
    }
}
