//! Dialing the chat server and the registration handshake.

use std::{path::Path, sync::Arc};

use {
    ircrelay_config::IrcConfig,
    rustls::{ClientConfig, RootCertStore, pki_types::ServerName},
    tokio::{
        io::{AsyncRead, AsyncWrite, BufReader},
        net::TcpStream,
    },
    tokio_rustls::TlsConnector,
    tracing::{debug, info, warn},
};

use crate::{
    error::{Context, Error, Result},
    protocol::Command,
    sender::ChatSender,
    writer::LineWriter,
};

type BoxedRead = Box<dyn AsyncRead + Send + Unpin>;

/// An established connection, split into a buffered read half and a shared
/// write half.
pub struct IrcConnection {
    reader: BufReader<BoxedRead>,
    writer: Arc<LineWriter>,
}

impl std::fmt::Debug for IrcConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IrcConnection")
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl IrcConnection {
    /// Wrap an already-connected byte stream.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read, write) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(Box::new(read)),
            writer: Arc::new(LineWriter::new(write)),
        }
    }

    #[must_use]
    pub fn writer(&self) -> Arc<LineWriter> {
        Arc::clone(&self.writer)
    }

    #[must_use]
    pub fn sender(&self) -> ChatSender {
        ChatSender::new(self.writer())
    }

    /// Send `PASS` (when a password is configured), `NICK` and `USER`.
    pub async fn register(&self, config: &IrcConfig) -> Result<()> {
        let mut guard = self.writer.lock().await;
        if let Some(password) = config.password() {
            guard
                .write_command(&Command::Pass(password.to_string()))
                .await?;
        }
        guard
            .write_command(&Command::Nick(config.nick.clone()))
            .await?;
        guard
            .write_command(&Command::User {
                user: config.user.clone(),
                realname: config.realname.clone(),
            })
            .await?;
        debug!(nick = %config.nick, "registration sent");
        Ok(())
    }

    pub fn into_parts(self) -> (BufReader<BoxedRead>, Arc<LineWriter>) {
        (self.reader, self.writer)
    }
}

/// Dial `config.server`, over TLS unless `config.tls` is off.
pub async fn connect(config: &IrcConfig) -> Result<IrcConnection> {
    let tcp = TcpStream::connect(&config.server)
        .await
        .with_context(|| format!("connect to {}", config.server))?;
    if let Err(e) = tcp.set_nodelay(true) {
        debug!(error = %e, "failed to set TCP_NODELAY");
    }

    if !config.tls {
        warn!(server = %config.server, "connected without TLS");
        return Ok(IrcConnection::from_stream(tcp));
    }

    let connector = TlsConnector::from(Arc::new(tls_config(config.ca_file.as_deref())?));
    let server_name = ServerName::try_from(config.host().to_string())?;
    let tls = connector
        .connect(server_name, tcp)
        .await
        .with_context(|| format!("TLS handshake with {}", config.server))?;

    info!(server = %config.server, "connected");
    Ok(IrcConnection::from_stream(tls))
}

/// Platform roots plus the certificates in `ca_file`, if given.
fn tls_config(ca_file: Option<&Path>) -> Result<ClientConfig> {
    // Another crate in the process may already have installed a provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let mut roots = RootCertStore::empty();
    let native = rustls_native_certs::load_native_certs();
    for e in &native.errors {
        debug!(error = %e, "skipped native certificate source");
    }
    let (added, ignored) = roots.add_parsable_certificates(native.certs);
    debug!(added, ignored, "loaded native root certificates");

    if let Some(path) = ca_file {
        let pem = std::fs::read(path)
            .with_context(|| format!("read CA file {}", path.display()))?;
        let mut reader = std::io::BufReader::new(pem.as_slice());
        let mut count = 0usize;
        for cert in rustls_pemfile::certs(&mut reader) {
            roots.add(cert?)?;
            count += 1;
        }
        if count == 0 {
            return Err(Error::message(format!(
                "no certificates found in {}",
                path.display()
            )));
        }
        debug!(path = %path.display(), count, "loaded extra CA certificates");
    }

    if roots.is_empty() {
        return Err(Error::message("no trusted root certificates available"));
    }

    Ok(ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth())
}
