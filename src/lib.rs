//! Client library for the cmux control socket.
//!
//! cmux is a terminal multiplexer that exposes a line-oriented text protocol
//! over a Unix domain socket. This crate finds the right socket for the
//! running instance, keeps a connection to it, and turns the protocol's
//! commands into typed calls.
//!
//! - [`locator`] picks a socket path from overrides, tags, a marker file,
//!   well-known names and discovery.
//! - [`client`] owns the connection and the request/response exchange.
//! - [`commands`] provides [`Commands`], the typed operations.
//! - [`config`] loads optional settings from `config.toml`.
//!
//! # Platform Support
//!
//! This crate supports **Unix-like systems only** (Linux, macOS).
//!
//! Unix-specific features used:
//! - Unix domain sockets for IPC
//! - Socket files under a shared temp directory

pub mod client;
pub mod commands;
pub mod config;
mod error;
pub mod locator;
pub mod logging;

pub use client::{
    AbortHandle, Client, CommandChannel, Connection, Framing, Quiescence, Sentinel, Timeouts,
};
pub use commands::{
    Commands, LogEntry, Notification, SplitDirection, Surface, Tab, Target,
};
pub use error::{Error, Result};
pub use locator::{LocatorConfig, SocketLocator};
