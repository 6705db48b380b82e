//! The seam between inbound surfaces (the webhook) and the chat transport.
//!
//! The gateway only knows these traits; the IRC crate implements them.

pub mod error;
pub mod plugin;

pub use {
    error::{Error, Result},
    plugin::{ChannelHealthSnapshot, ChannelOutbound, ChannelStatus},
};
