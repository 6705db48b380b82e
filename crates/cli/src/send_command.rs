use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use {
    anyhow::{Context, Result},
    ircrelay_config::WebhookConfig,
};

/// Post `message` to the local webhook and report the response status.
pub async fn send(config: &WebhookConfig, message: &str) -> Result<()> {
    let url = webhook_url(config)?;
    let resp = reqwest::Client::new()
        .post(&url)
        .json(&serde_json::json!({ "message": message }))
        .send()
        .await
        .with_context(|| format!("POST {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("webhook returned {status}: {body}");
    }
    println!("{status}");
    Ok(())
}

/// URL of the webhook. A wildcard bind is reached over loopback, the only
/// peer the relay accepts.
fn webhook_url(config: &WebhookConfig) -> Result<String> {
    let mut addr = config
        .socket_addr()
        .with_context(|| format!("invalid webhook bind address {:?}", config.bind))?;
    if addr.ip().is_unspecified() {
        addr.set_ip(match addr.ip() {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
        });
    }
    Ok(format!("http://{addr}{}", config.path))
}
