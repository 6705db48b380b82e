//! The read loop: one task owns the read half for the life of the connection.

use std::sync::Arc;

use {
    tokio::{
        io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt},
        sync::watch,
    },
    tracing::{debug, info, trace, warn},
};

use crate::{
    commands::CommandDispatcher,
    error::{Error, Result},
    protocol::MAX_INBOUND_LINE_BYTES,
    registration::{Registration, RegistrationState},
    writer::LineWriter,
};

/// Read lines until the server closes the connection.
///
/// Each line goes to the registration state machine first, whose replies
/// must reach the server or the loop fails, then to the command dispatcher,
/// whose failures are only logged. State changes are published on
/// `state_tx`. Returns `Ok(())` on EOF and an error once a line runs past
/// [`MAX_INBOUND_LINE_BYTES`] without a newline.
pub async fn run_listener<R>(
    mut reader: R,
    mut registration: Registration,
    dispatcher: CommandDispatcher,
    writer: Arc<LineWriter>,
    state_tx: watch::Sender<RegistrationState>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        let limit = MAX_INBOUND_LINE_BYTES as u64;
        if (&mut reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
            info!("server closed the connection");
            return Ok(());
        }
        if buf.len() == MAX_INBOUND_LINE_BYTES && buf.last() != Some(&b'\n') {
            return Err(Error::message(format!(
                "inbound line exceeds {MAX_INBOUND_LINE_BYTES} bytes"
            )));
        }

        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.strip_suffix('\n').unwrap_or(&decoded);
        let line = line.strip_suffix('\r').unwrap_or(line);
        trace!(line, "<-");

        for command in registration.on_line(line) {
            writer.send(&command).await?;
        }

        let state = registration.state();
        state_tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            debug!(?state, "registration state changed");
            *current = state;
            true
        });

        if let Err(e) = dispatcher.on_line(line).await {
            warn!(error = %e, "failed to answer command");
        }
    }
}
