use {
    crate::registration::RegistrationState,
    ircrelay_channels::{ChannelHealthSnapshot, ChannelStatus},
    tokio::sync::watch,
};

/// Health view of the connection, fed by the read loop.
#[derive(Debug, Clone)]
pub struct IrcStatus {
    state: watch::Receiver<RegistrationState>,
    channel: String,
}

impl IrcStatus {
    pub fn new(state: watch::Receiver<RegistrationState>, channel: impl Into<String>) -> Self {
        Self {
            state,
            channel: channel.into(),
        }
    }
}

impl ChannelStatus for IrcStatus {
    fn probe(&self) -> ChannelHealthSnapshot {
        let state = *self.state.borrow();
        // A closed sender means the read loop is gone along with the connection.
        let closed = self.state.has_changed().is_err();
        let details = if closed {
            Some("connection closed".to_string())
        } else if !state.is_registered() {
            Some("waiting for registration".to_string())
        } else {
            None
        };
        ChannelHealthSnapshot {
            connected: state.is_registered() && !closed,
            channel: self.channel.clone(),
            details,
        }
    }
}
