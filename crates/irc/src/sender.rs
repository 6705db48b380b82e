//! Relaying text to a target as one or more `PRIVMSG` lines.

use std::{borrow::Cow, sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    ircrelay_channels::{ChannelOutbound, Error as ChannelError},
    tracing::{debug, warn},
};

use crate::{
    error::{Error, Result},
    protocol::{Command, MAX_LINE_BODY_BYTES},
    split::split_message,
    writer::LineWriter,
};

/// Sends messages over the shared [`LineWriter`].
///
/// Cheap to clone; every clone writes through the same connection.
#[derive(Debug, Clone)]
pub struct ChatSender {
    writer: Arc<LineWriter>,
}

impl ChatSender {
    pub fn new(writer: Arc<LineWriter>) -> Self {
        Self { writer }
    }

    /// Send `message` to `target`, split to fit the line limit.
    ///
    /// Returns the number of lines written. The connection stays locked for
    /// the whole message, including the `delay` slept between lines, so
    /// concurrent sends never interleave on the wire.
    pub async fn send(&self, target: &str, message: &str, delay: Duration) -> Result<usize> {
        let overhead = Command::privmsg_overhead(target);
        if overhead >= MAX_LINE_BODY_BYTES {
            return Err(Error::TargetTooLong {
                target: target.to_string(),
                overhead,
            });
        }
        let budget = MAX_LINE_BODY_BYTES - overhead;

        let lines = sanitize_lines(message);
        let mut chunks = Vec::new();
        for line in &lines {
            chunks.extend(split_message(line, budget)?);
        }

        let total = chunks.len();
        if total == 0 {
            return Ok(0);
        }

        let mut guard = self.writer.lock().await;
        for (sent, chunk) in chunks.into_iter().enumerate() {
            if sent > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let command = Command::Privmsg {
                target: target.to_string(),
                text: chunk.to_string(),
            };
            if let Err(source) = guard.write_command(&command).await {
                warn!(to = %target, sent, total, error = %source, "send abandoned");
                return Err(Error::Partial {
                    sent,
                    total,
                    source,
                });
            }
        }

        debug!(to = %target, lines = total, "message sent");
        Ok(total)
    }
}

/// Break `message` into lines safe to embed in a single protocol line.
fn sanitize_lines(message: &str) -> Vec<Cow<'_, str>> {
    message
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.contains(['\r', '\0']) {
                Cow::Owned(line.replace(['\r', '\0'], " "))
            } else {
                Cow::Borrowed(line)
            }
        })
        .collect()
}

#[async_trait]
impl ChannelOutbound for ChatSender {
    async fn send_text(
        &self,
        to: &str,
        text: &str,
        pacing: Duration,
    ) -> ircrelay_channels::Result<()> {
        match self.send(to, text, pacing).await {
            Ok(_) => Ok(()),
            Err(e @ (Error::InvalidBudget { .. } | Error::TargetTooLong { .. })) => {
                Err(ChannelError::invalid_input(e))
            },
            Err(e) => Err(ChannelError::external(format!("relay to {to}"), e)),
        }
    }
}
