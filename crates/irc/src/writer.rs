//! Serialised access to the write half of the server connection.

use {
    crate::protocol::{Command, LINE_TERMINATOR},
    tokio::{
        io::{AsyncWrite, AsyncWriteExt},
        sync::{Mutex, MutexGuard},
    },
    tracing::trace,
};

type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

/// Owns the write half and hands out exclusive guards.
///
/// Everything that reaches the wire goes through a [`LineGuard`], so a
/// caller holding one has the connection to itself until it drops it.
pub struct LineWriter {
    inner: Mutex<BoxedWrite>,
}

impl LineWriter {
    pub fn new(write: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            inner: Mutex::new(Box::new(write)),
        }
    }

    /// Wait for exclusive access to the connection.
    pub async fn lock(&self) -> LineGuard<'_> {
        LineGuard {
            inner: self.inner.lock().await,
        }
    }

    /// Write one command under a short-lived lock.
    pub async fn send(&self, command: &Command) -> std::io::Result<()> {
        self.lock().await.write_command(command).await
    }
}

impl std::fmt::Debug for LineWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineWriter").finish_non_exhaustive()
    }
}

pub struct LineGuard<'a> {
    inner: MutexGuard<'a, BoxedWrite>,
}

impl LineGuard<'_> {
    /// Write `line` followed by CRLF and flush.
    pub async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        let mut buf = Vec::with_capacity(line.len() + LINE_TERMINATOR.len());
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(LINE_TERMINATOR.as_bytes());
        self.inner.write_all(&buf).await?;
        self.inner.flush().await
    }

    pub async fn write_command(&mut self, command: &Command) -> std::io::Result<()> {
        match command {
            Command::Pass(_) => trace!("-> PASS [REDACTED]"),
            other => trace!(line = %other, "->"),
        }
        self.write_line(&command.to_string()).await
    }
}
