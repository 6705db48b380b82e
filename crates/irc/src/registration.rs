//! Registration state machine: answers keepalives and joins the channel
//! once the server has finished the welcome burst.

use tracing::info;

use crate::protocol::Command;

/// Where the connection is in its lifecycle. Moves forward once, never back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RegistrationState {
    #[default]
    Unregistered,
    Registered,
}

impl RegistrationState {
    #[must_use]
    pub fn is_registered(self) -> bool {
        self == Self::Registered
    }
}

/// Payload of a server keepalive, echoed back in the `PONG`.
fn ping_payload(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("PING")?;
    if rest.is_empty() {
        return Some("");
    }
    rest.strip_prefix(' ')
}

/// `RPL_ISUPPORT` (005), taken as the end of the welcome burst.
///
/// Detected by substring, so a chat message containing " 005 " matches too.
/// Only the first match has any effect.
fn ends_welcome_burst(line: &str) -> bool {
    line.contains(" 005 ")
}

#[derive(Debug)]
pub struct Registration {
    state: RegistrationState,
    channel: String,
}

impl Registration {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            state: RegistrationState::Unregistered,
            channel: channel.into(),
        }
    }

    #[must_use]
    pub fn state(&self) -> RegistrationState {
        self.state
    }

    /// Feed one inbound line; returns the commands to write in response.
    ///
    /// The keepalive and end-of-burst checks are independent, so one line
    /// can yield both a `PONG` and the `JOIN`, in that order.
    pub fn on_line(&mut self, line: &str) -> Vec<Command> {
        let mut replies = Vec::new();
        if let Some(payload) = ping_payload(line) {
            replies.push(Command::Pong(payload.to_string()));
        }
        if !self.state.is_registered() && ends_welcome_burst(line) {
            self.state = RegistrationState::Registered;
            info!(channel = %self.channel, "registered, joining channel");
            replies.push(Command::Join(self.channel.clone()));
        }
        replies
    }
}
