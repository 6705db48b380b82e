use std::time::Duration;

use {async_trait::async_trait, crate::Result};

/// Send messages to a chat target.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Deliver `text` to `to`, waiting `pacing` between protocol lines when
    /// the text has to be split.
    async fn send_text(&self, to: &str, text: &str, pacing: Duration) -> Result<()>;
}

/// Report whether the transport is ready to relay.
pub trait ChannelStatus: Send + Sync {
    fn probe(&self) -> ChannelHealthSnapshot;
}

/// Channel health snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHealthSnapshot {
    /// Registered with the server and joined to the managed channel.
    pub connected: bool,
    /// The managed channel.
    pub channel: String,
    pub details: Option<String>,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::Error,
        std::sync::{Arc, Mutex},
    };

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String, Duration)>>,
    }

    #[async_trait]
    impl ChannelOutbound for Recorder {
        async fn send_text(&self, to: &str, text: &str, pacing: Duration) -> Result<()> {
            if text.is_empty() {
                return Err(Error::invalid_input("empty text"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), text.to_string(), pacing));
            Ok(())
        }
    }

    #[tokio::test]
    async fn outbound_is_object_safe() {
        let recorder = Arc::new(Recorder::default());
        let outbound: Arc<dyn ChannelOutbound> = recorder.clone();

        outbound
            .send_text("#bots", "hello", Duration::from_millis(5))
            .await
            .unwrap();
        let err = outbound
            .send_text("#bots", "", Duration::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput { .. }));
        assert_eq!(recorder.sent.lock().unwrap().as_slice(), &[(
            "#bots".to_string(),
            "hello".to_string(),
            Duration::from_millis(5)
        )]);
    }

    #[test]
    fn external_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err = Error::external("relay to #bots", io);
        assert_eq!(
            err.to_string(),
            "channel operation failed: relay to #bots: gone"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
