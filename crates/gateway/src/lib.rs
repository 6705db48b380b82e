//! Gateway: the local HTTP surface of the relay.
//!
//! Lifecycle:
//! 1. Build the router around an [`server::AppState`] (webhook + health)
//! 2. Bind `webhook.bind:webhook.port`
//! 3. Serve until the listener fails or the process exits
//!
//! The chat transport is reached only through the `ircrelay-channels`
//! traits, so the router can be driven in tests without a server.

pub mod server;
pub mod webhook;

pub use server::{AppState, build_gateway_app, start_gateway};
