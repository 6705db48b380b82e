//! Webhook relay endpoint.
//!
//! `POST <webhook.path>` with `{"message": "..."}` relays the message into
//! the managed channel. Checks run in this order:
//! - peer not on loopback: dropped, `200` with an empty body
//! - `Content-Type` not `application/json`: `415`
//! - body not an object with a non-empty string `message`: `400`
//! - chat connection not registered yet: `503`
//! - another relay still in flight: `429`
//!
//! Delivery failures are logged and never reported to the caller. Only one
//! relay runs at a time so inbound keep-alive replies, which share the
//! connection lock, wait behind at most a single paced message.

use std::net::SocketAddr;

use {
    axum::{
        Json,
        body::Bytes,
        extract::{ConnectInfo, State},
        http::{HeaderMap, StatusCode, header},
        response::{IntoResponse, Response},
    },
    serde::Deserialize,
    tracing::{debug, info, warn},
};

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub message: String,
}

/// `POST <webhook.path>`
pub async fn webhook_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !peer.ip().to_canonical().is_loopback() {
        warn!(%peer, "dropping webhook from non-loopback peer");
        return StatusCode::OK.into_response();
    }

    if !is_json(&headers) {
        return error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected Content-Type: application/json",
        );
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "rejecting malformed webhook payload");
            return error_response(StatusCode::BAD_REQUEST, "bogus JSON payload");
        },
    };
    if payload.message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message field cannot be empty");
    }

    if !state.status.probe().connected {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "not registered with the chat server yet",
        );
    }

    let Ok(_permit) = state.relay_slot.try_acquire() else {
        debug!("rejecting webhook while another relay is in flight");
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "another message is still being relayed",
        );
    };

    match state
        .outbound
        .send_text(&state.channel, &payload.message, state.pacing)
        .await
    {
        Ok(()) => info!(
            channel = %state.channel,
            bytes = payload.message.len(),
            "relayed webhook message"
        ),
        Err(e) => warn!(channel = %state.channel, error = %e, "failed to relay webhook message"),
    }

    StatusCode::OK.into_response()
}

/// Media type is `application/json`, parameters such as `charset` allowed.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "ok": false, "error": error })),
    )
        .into_response()
}
