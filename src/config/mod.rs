//! Client configuration read from `config.toml`.
//!
//! The file has three optional sections: `[socket]` feeds the locator,
//! `[timeouts]` feeds the connection and `[log]` sets the default filter.

pub mod error;
pub mod loader;
pub mod schema;
pub mod xdg;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::Config;
