//! Integration tests for the webhook relay endpoint and the health route.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    async_trait::async_trait,
    axum::{
        Router,
        body::{Body, to_bytes},
        extract::connect_info::MockConnectInfo,
        http::{Request, StatusCode, header},
    },
    rstest::rstest,
    tokio::{net::TcpListener, sync::Notify},
    tower::ServiceExt,
};

use {
    ircrelay_channels::{ChannelHealthSnapshot, ChannelOutbound, ChannelStatus, Error, Result},
    ircrelay_config::WebhookConfig,
    ircrelay_gateway::{AppState, build_gateway_app},
};

// ── Fakes ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingOutbound {
    sent: Mutex<Vec<(String, String, Duration)>>,
    fail: bool,
}

impl RecordingOutbound {
    fn sent(&self) -> Vec<(String, String, Duration)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(&self, to: &str, text: &str, pacing: Duration) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string(), pacing));
        if self.fail {
            let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "connection lost");
            return Err(Error::external("relay to #bots", io));
        }
        Ok(())
    }
}

/// Blocks inside `send_text` until the test releases it.
#[derive(Default)]
struct HeldOutbound {
    sent: Mutex<Vec<String>>,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ChannelOutbound for HeldOutbound {
    async fn send_text(&self, _to: &str, text: &str, _pacing: Duration) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

struct FixedStatus(bool);

impl ChannelStatus for FixedStatus {
    fn probe(&self) -> ChannelHealthSnapshot {
        ChannelHealthSnapshot {
            connected: self.0,
            channel: "#bots".into(),
            details: (!self.0).then(|| "waiting for registration".to_string()),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

const LOOPBACK: &str = "127.0.0.1:40000";

fn test_config() -> WebhookConfig {
    WebhookConfig {
        max_body_bytes: 1024,
        ..WebhookConfig::default()
    }
}

fn app_with(outbound: Arc<RecordingOutbound>, registered: bool) -> Router {
    let state = AppState::new(
        outbound,
        Arc::new(FixedStatus(registered)),
        "#bots",
        Duration::from_millis(500),
    );
    build_gateway_app(state, &test_config())
}

fn from_peer(app: Router, peer: &str) -> Router {
    app.layer(MockConnectInfo(peer.parse::<SocketAddr>().unwrap()))
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/sendmsg")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ── Webhook ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn relays_message_to_channel() {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let resp = app
        .oneshot(post_json(r#"{"message":"deploy finished"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.is_empty());
    assert_eq!(outbound.sent(), vec![(
        "#bots".to_string(),
        "deploy finished".to_string(),
        Duration::from_millis(500)
    )]);
}

#[tokio::test]
async fn only_post_is_allowed() {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let resp = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/sendmsg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(outbound.sent().is_empty());
}

#[rstest]
#[case("10.0.0.5:40000")]
#[case("192.168.1.20:5000")]
#[case("[2001:db8::1]:5000")]
#[tokio::test]
async fn non_loopback_peer_is_silently_dropped(#[case] peer: &str) {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), peer);

    let resp = app
        .oneshot(post_json(r#"{"message":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.is_empty());
    assert!(outbound.sent().is_empty());
}

#[rstest]
#[case("[::1]:40000")]
#[case("[::ffff:127.0.0.1]:40000")]
#[case("127.0.0.2:40000")]
#[tokio::test]
async fn loopback_variants_are_accepted(#[case] peer: &str) {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), peer);

    let resp = app
        .oneshot(post_json(r#"{"message":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(outbound.sent().len(), 1);
}

#[rstest]
#[case(Some("text/plain"))]
#[case(Some("application/x-www-form-urlencoded"))]
#[case(None)]
#[tokio::test]
async fn non_json_content_type_is_415(#[case] content_type: Option<&str>) {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let mut req = Request::builder().method("POST").uri("/sendmsg");
    if let Some(ct) = content_type {
        req = req.header(header::CONTENT_TYPE, ct);
    }
    let resp = app
        .oneshot(req.body(Body::from(r#"{"message":"hi"}"#)).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(outbound.sent().is_empty());
}

#[tokio::test]
async fn charset_parameter_is_accepted() {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let req = Request::builder()
        .method("POST")
        .uri("/sendmsg")
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(r#"{"message":"hi"}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(outbound.sent().len(), 1);
}

#[rstest]
#[case("not json")]
#[case("")]
#[case("[]")]
#[case(r#""message""#)]
#[case(r#"{"msg":"hi"}"#)]
#[case(r#"{"message":42}"#)]
#[case(r#"{"message":null}"#)]
#[case(r#"{"message":""}"#)]
#[tokio::test]
async fn bad_payload_is_400(#[case] body: &'static str) {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let resp = app.oneshot(post_json(body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["ok"], false);
    assert!(outbound.sent().is_empty());
}

#[tokio::test]
async fn extra_fields_are_ignored() {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let resp = app
        .oneshot(post_json(r#"{"message":"hi","source":"ci"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(outbound.sent()[0].1, "hi");
}

#[tokio::test]
async fn unregistered_relay_is_503() {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), false), LOOPBACK);

    let resp = app
        .oneshot(post_json(r#"{"message":"too early"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(outbound.sent().is_empty());
}

#[tokio::test]
async fn delivery_failure_still_returns_200() {
    let outbound = Arc::new(RecordingOutbound {
        fail: true,
        ..RecordingOutbound::default()
    });
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let resp = app
        .oneshot(post_json(r#"{"message":"lost"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.is_empty());
    assert_eq!(outbound.sent().len(), 1);
}

#[tokio::test]
async fn second_relay_is_rejected_while_first_is_in_flight() {
    let outbound = Arc::new(HeldOutbound::default());
    let state = AppState::new(
        outbound.clone(),
        Arc::new(FixedStatus(true)),
        "#bots",
        Duration::ZERO,
    );
    let app = from_peer(build_gateway_app(state, &test_config()), LOOPBACK);

    let first = tokio::spawn(
        app.clone()
            .oneshot(post_json(r#"{"message":"first"}"#)),
    );
    outbound.started.notified().await;

    let resp = app
        .clone()
        .oneshot(post_json(r#"{"message":"second"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(body_text(resp).await.contains(r#""ok":false"#));

    outbound.release.notify_one();
    let resp = first.await.unwrap().unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The slot is free again once the first relay finished.
    outbound.release.notify_one();
    let resp = app
        .oneshot(post_json(r#"{"message":"third"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(*outbound.sent.lock().unwrap(), vec!["first", "third"]);
}

#[tokio::test]
async fn malformed_request_is_rejected_while_relay_is_in_flight() {
    let outbound = Arc::new(HeldOutbound::default());
    let state = AppState::new(
        outbound.clone(),
        Arc::new(FixedStatus(true)),
        "#bots",
        Duration::ZERO,
    );
    let app = from_peer(build_gateway_app(state, &test_config()), LOOPBACK);

    let first = tokio::spawn(
        app.clone()
            .oneshot(post_json(r#"{"message":"first"}"#)),
    );
    outbound.started.notified().await;

    let resp = app.oneshot(post_json("not json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    outbound.release.notify_one();
    assert_eq!(first.await.unwrap().unwrap().status(), StatusCode::OK);
    assert_eq!(*outbound.sent.lock().unwrap(), vec!["first"]);
}

#[tokio::test]
async fn oversized_body_is_413() {
    let outbound = Arc::new(RecordingOutbound::default());
    let app = from_peer(app_with(Arc::clone(&outbound), true), LOOPBACK);

    let body = format!(r#"{{"message":"{}"}}"#, "a".repeat(2048));
    let resp = app.oneshot(post_json(body)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(outbound.sent().is_empty());
}

#[tokio::test]
async fn custom_path_is_served() {
    let outbound = Arc::new(RecordingOutbound::default());
    let config = WebhookConfig {
        path: "/hooks/ci".into(),
        ..test_config()
    };
    let state = AppState::new(
        outbound.clone(),
        Arc::new(FixedStatus(true)),
        "#bots",
        Duration::ZERO,
    );
    let app = from_peer(build_gateway_app(state, &config), LOOPBACK);

    let req = Request::builder()
        .method("POST")
        .uri("/hooks/ci")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"message":"hi"}"#))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(post_json(r#"{"message":"hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(outbound.sent().len(), 1);
}

// ── Health ───────────────────────────────────────────────────────────────────

#[rstest]
#[case(true, "ok")]
#[case(false, "degraded")]
#[tokio::test]
async fn health_reports_registration(#[case] registered: bool, #[case] status: &str) {
    let app = app_with(Arc::new(RecordingOutbound::default()), registered);

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
    assert_eq!(json["status"], status);
    assert_eq!(json["registered"], registered);
    assert_eq!(json["channel"], "#bots");
    assert!(json["version"].is_string());
}

// ── Real server ──────────────────────────────────────────────────────────────

/// Start a test server on an ephemeral loopback port.
async fn start_server(outbound: Arc<RecordingOutbound>) -> SocketAddr {
    let app = app_with(outbound, true);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });
    addr
}

#[tokio::test]
async fn round_trip_over_tcp() {
    let outbound = Arc::new(RecordingOutbound::default());
    let addr = start_server(Arc::clone(&outbound)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/sendmsg"))
        .json(&serde_json::json!({ "message": "from curl" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(resp.text().await.unwrap().is_empty());

    let resp = client
        .post(format!("http://{addr}/sendmsg"))
        .header("content-type", "text/plain")
        .body("from curl")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 415);

    assert_eq!(outbound.sent().len(), 1);
    assert_eq!(outbound.sent()[0].1, "from curl");
}
