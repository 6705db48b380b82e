//! IRC transport for the relay.
//!
//! Dials the chat server, registers, keeps the connection alive and joined
//! to one channel, answers `!status`, and delivers relayed text split into
//! protocol-sized lines.

pub mod client;
pub mod commands;
pub mod error;
pub mod listener;
pub mod protocol;
pub mod registration;
pub mod sender;
pub mod split;
pub mod status;
pub mod writer;

pub use {
    client::{IrcConnection, connect},
    commands::CommandDispatcher,
    error::{Error, Result},
    listener::run_listener,
    registration::{Registration, RegistrationState},
    sender::ChatSender,
    status::IrcStatus,
    writer::LineWriter,
};
