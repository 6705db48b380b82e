//! Semantic validation of a loaded [`RelayConfig`].
//!
//! Errors make the relay refuse to start; warnings and infos are logged.

use crate::{
    error::{Error, Result},
    schema::{IrcConfig, RelayConfig, WebhookConfig},
};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "required", "format", "security", "file-ref", "tuning"
    pub category: &'static str,
    /// Dotted path, e.g. "irc.channel"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.category, self.path, self.message
        )
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Turn error diagnostics into [`Error::Invalid`], passing the
    /// result through untouched when there are none.
    pub fn into_result(self) -> Result<Self> {
        if !self.has_errors() {
            return Ok(self);
        }
        let errors = self
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| format!("{}: {}", d.path, d.message))
            .collect();
        Err(Error::Invalid { errors })
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: &str,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.to_string(),
            message: message.into(),
        });
    }
}

impl RelayConfig {
    /// Validate the whole configuration.
    #[must_use]
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        check_irc(&self.irc, &mut result);
        check_webhook(&self.webhook, &mut result);
        result
    }
}

/// Route served by the gateway's health handler.
const HEALTH_PATH: &str = "/health";

fn has_line_break(value: &str) -> bool {
    value.contains(['\r', '\n', '\0'])
}

fn check_irc(irc: &IrcConfig, result: &mut ValidationResult) {
    if irc.server.is_empty() {
        result.push(Severity::Error, "required", "irc.server", "must not be empty");
    } else {
        let port = irc
            .server
            .rsplit_once(':')
            .map(|(_, port)| port)
            .filter(|_| !irc.server.ends_with(']'));
        match port.map(str::parse::<u16>) {
            Some(Ok(_)) => {},
            _ => result.push(
                Severity::Error,
                "format",
                "irc.server",
                format!("expected host:port, got {:?}", irc.server),
            ),
        }
    }

    let channel_ok = irc.channel.len() > 1
        && irc.channel.starts_with(['#', '&'])
        && !irc
            .channel
            .contains(|c: char| c == ' ' || c == ',' || c.is_control());
    if !channel_ok {
        result.push(
            Severity::Error,
            "format",
            "irc.channel",
            format!(
                "expected a channel name starting with '#' or '&' without spaces or commas, got {:?}",
                irc.channel
            ),
        );
    }

    for (path, value) in [("irc.nick", &irc.nick), ("irc.user", &irc.user)] {
        if value.is_empty() {
            result.push(Severity::Error, "required", path, "must not be empty");
        } else if value.contains(|c: char| c.is_whitespace() || c.is_control()) {
            result.push(
                Severity::Error,
                "format",
                path,
                "must not contain whitespace or control characters",
            );
        }
    }

    if has_line_break(&irc.realname) {
        result.push(
            Severity::Error,
            "format",
            "irc.realname",
            "must not contain line breaks",
        );
    }
    if irc.password().is_some_and(has_line_break) {
        result.push(
            Severity::Error,
            "format",
            "irc.password",
            "must not contain line breaks",
        );
    }

    if !irc.tls {
        result.push(
            Severity::Warning,
            "security",
            "irc.tls",
            "TLS is disabled; traffic and the server password travel in clear text",
        );
    }

    if let Some(ca_file) = &irc.ca_file
        && !ca_file.exists()
    {
        result.push(
            Severity::Error,
            "file-ref",
            "irc.ca_file",
            format!("file not found: {}", ca_file.display()),
        );
    }
}

fn check_webhook(webhook: &WebhookConfig, result: &mut ValidationResult) {
    match webhook.socket_addr() {
        Ok(addr) if !addr.ip().is_loopback() => result.push(
            Severity::Warning,
            "security",
            "webhook.bind",
            format!(
                "{} is not a loopback address; non-loopback callers are dropped anyway",
                webhook.bind
            ),
        ),
        Ok(_) => {},
        Err(e) => result.push(
            Severity::Error,
            "format",
            "webhook.bind",
            format!("invalid bind address {:?}: {e}", webhook.bind),
        ),
    }

    if !webhook.path.starts_with('/') {
        result.push(
            Severity::Error,
            "format",
            "webhook.path",
            format!("must start with '/', got {:?}", webhook.path),
        );
    } else if webhook.path == HEALTH_PATH {
        result.push(
            Severity::Error,
            "format",
            "webhook.path",
            format!("{HEALTH_PATH} is reserved for the health check"),
        );
    }

    if webhook.max_body_bytes == 0 {
        result.push(
            Severity::Error,
            "required",
            "webhook.max_body_bytes",
            "must be greater than zero",
        );
    }

    if webhook.pacing_ms == 0 {
        result.push(
            Severity::Info,
            "tuning",
            "webhook.pacing_ms",
            "no delay between chunks; long messages may trip server flood limits",
        );
    }
}
