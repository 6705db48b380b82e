use std::sync::Arc;

use {
    anyhow::{Context, Result},
    ircrelay_config::{RelayConfig, Severity},
    ircrelay_gateway::{AppState, start_gateway},
    ircrelay_irc::{
        CommandDispatcher, IrcStatus, Registration, RegistrationState, connect, run_listener,
    },
    tokio::sync::watch,
    tracing::{error, info, warn},
};

/// Dial the chat server, start the read loop and serve the webhook until
/// either side stops. Both ending is an error: there is no reconnect.
pub async fn run(config: RelayConfig) -> Result<()> {
    let validation = config.validate();
    for d in &validation.diagnostics {
        match d.severity {
            Severity::Error => error!(path = %d.path, "{}", d.message),
            Severity::Warning => warn!(path = %d.path, "{}", d.message),
            Severity::Info => info!(path = %d.path, "{}", d.message),
        }
    }
    validation.into_result()?;

    let irc = &config.irc;
    let conn = connect(irc).await?;
    conn.register(irc).await.context("failed to send registration")?;

    let sender = conn.sender();
    let (reader, writer) = conn.into_parts();
    let (state_tx, state_rx) = watch::channel(RegistrationState::Unregistered);

    let listener = tokio::spawn(run_listener(
        reader,
        Registration::new(&irc.channel),
        CommandDispatcher::new(&irc.channel, sender.clone()),
        writer,
        state_tx,
    ));

    let state = AppState::new(
        Arc::new(sender),
        Arc::new(IrcStatus::new(state_rx, &irc.channel)),
        &irc.channel,
        config.webhook.pacing(),
    );

    tokio::select! {
        joined = listener => match joined {
            Ok(Ok(())) => anyhow::bail!("chat server closed the connection"),
            Ok(Err(e)) => Err(e).context("connection to the chat server failed"),
            Err(e) => Err(e).context("read loop aborted"),
        },
        served = start_gateway(state, &config.webhook) => {
            served.context("webhook server stopped")
        },
    }
}
