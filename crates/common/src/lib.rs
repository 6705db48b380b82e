//! Shared error helpers used across the ircrelay crates.

pub mod error;

pub use error::FromMessage;
