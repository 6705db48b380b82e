use std::{net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{
        Router,
        extract::{DefaultBodyLimit, State},
        response::{IntoResponse, Json},
        routing::{get, post},
    },
    ircrelay_channels::{ChannelOutbound, ChannelStatus},
    ircrelay_config::WebhookConfig,
    tokio::sync::Semaphore,
    tower_http::trace::TraceLayer,
    tracing::info,
};

use crate::webhook::webhook_handler;

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub outbound: Arc<dyn ChannelOutbound>,
    pub status: Arc<dyn ChannelStatus>,
    /// Channel every webhook message is relayed into.
    pub channel: String,
    /// Delay between the lines of one relayed message.
    pub pacing: Duration,
    /// One permit: at most one webhook relay is in flight at a time.
    pub relay_slot: Arc<Semaphore>,
}

impl AppState {
    pub fn new(
        outbound: Arc<dyn ChannelOutbound>,
        status: Arc<dyn ChannelStatus>,
        channel: impl Into<String>,
        pacing: Duration,
    ) -> Self {
        Self {
            outbound,
            status,
            channel: channel.into(),
            pacing,
            relay_slot: Arc::new(Semaphore::new(1)),
        }
    }
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the gateway router (shared between production startup and tests).
///
/// The webhook route only accepts `POST`; axum answers other methods with
/// 405. Bodies above `config.max_body_bytes` are refused with 413.
pub fn build_gateway_app(state: AppState, config: &WebhookConfig) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(&config.path, post(webhook_handler))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured address and serve until the listener fails.
pub async fn start_gateway(state: AppState, config: &WebhookConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let app = build_gateway_app(state, config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        path = %config.path,
        "webhook listening"
    );
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.status.probe();
    Json(serde_json::json!({
        "status": if snapshot.connected { "ok" } else { "degraded" },
        "version": env!("CARGO_PKG_VERSION"),
        "registered": snapshot.connected,
        "channel": snapshot.channel,
        "details": snapshot.details,
    }))
}
