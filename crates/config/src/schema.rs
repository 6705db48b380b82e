/// Config schema types for the chat connection and the webhook listener.
use std::{net::SocketAddr, path::PathBuf, time::Duration};

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub irc: IrcConfig,
    pub webhook: WebhookConfig,
}

/// Chat server connection and identity.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct IrcConfig {
    /// Server address as `host:port`.
    pub server: String,
    /// Dial with TLS. Defaults to true.
    pub tls: bool,
    /// Extra PEM bundle trusted in addition to the platform roots.
    pub ca_file: Option<PathBuf>,
    /// Channel to join and relay into (e.g. `"#bots"`).
    pub channel: String,
    pub nick: String,
    pub user: String,
    pub realname: String,
    /// Server password sent with `PASS`. Empty means none.
    pub password: Option<Secret<String>>,
}

impl IrcConfig {
    /// The configured server password, if one is set and non-empty.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password
            .as_ref()
            .map(|p| p.expose_secret().as_str())
            .filter(|p| !p.is_empty())
    }

    /// Host part of [`Self::server`], used as the TLS server name.
    #[must_use]
    pub fn host(&self) -> &str {
        let server = self.server.as_str();
        if let Some(rest) = server.strip_prefix('[') {
            // Bracketed IPv6 literal: "[::1]:6697".
            return rest.split_once(']').map_or(rest, |(host, _)| host);
        }
        server.rsplit_once(':').map_or(server, |(host, _)| host)
    }
}

impl std::fmt::Debug for IrcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrcConfig")
            .field("server", &self.server)
            .field("tls", &self.tls)
            .field("ca_file", &self.ca_file)
            .field("channel", &self.channel)
            .field("nick", &self.nick)
            .field("user", &self.user)
            .field("realname", &self.realname)
            .field(
                "password",
                &self.password().map(|_| "[REDACTED]").unwrap_or("<none>"),
            )
            .finish()
    }
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: "irc.example.net:6697".into(),
            tls: true,
            ca_file: None,
            channel: "#bots".into(),
            nick: "smolbot".into(),
            user: "smolbot".into(),
            realname: "Just a smol bean".into(),
            password: None,
        }
    }
}

/// Local HTTP webhook listener.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 21337.
    pub port: u16,
    /// Route the webhook is served on.
    pub path: String,
    /// Delay between chunks of one relayed message (ms).
    pub pacing_ms: u64,
    /// Maximum accepted request body size.
    pub max_body_bytes: usize,
}

impl WebhookConfig {
    #[must_use]
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Parse `bind:port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        if self.bind.contains(':') && !self.bind.starts_with('[') {
            format!("[{}]:{}", self.bind, self.port).parse()
        } else {
            format!("{}:{}", self.bind, self.port).parse()
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 21337,
            path: "/sendmsg".into(),
            pacing_ms: 500,
            max_body_bytes: 64 * 1024,
        }
    }
}
