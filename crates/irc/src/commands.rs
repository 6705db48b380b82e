//! In-channel commands. Only `!status` exists.

use std::time::Duration;

use tracing::debug;

use crate::{error::Result, sender::ChatSender};

/// Reply sent for `!status` in the managed channel.
pub const STATUS_REPLY: &str = "Status OK";

const STATUS_TRIGGER: &str = "!status";

/// Recognises `!status` addressed to the managed channel and answers it.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    channel: String,
    sender: ChatSender,
}

impl CommandDispatcher {
    pub fn new(channel: impl Into<String>, sender: ChatSender) -> Self {
        Self {
            channel: channel.into(),
            sender,
        }
    }

    /// Handle one inbound line. Returns whether a reply was sent.
    pub async fn on_line(&self, line: &str) -> Result<bool> {
        if !is_status_request(line, &self.channel) {
            return Ok(false);
        }
        debug!(channel = %self.channel, "answering !status");
        self.sender
            .send(&self.channel, STATUS_REPLY, Duration::ZERO)
            .await?;
        Ok(true)
    }
}

/// `:<prefix> PRIVMSG <target> :...!status...` with `target == channel`.
fn is_status_request(line: &str, channel: &str) -> bool {
    if !line.contains("PRIVMSG") || !line.contains(STATUS_TRIGGER) {
        return false;
    }
    line.split_whitespace()
        .nth(2)
        .is_some_and(|target| target == channel)
}
