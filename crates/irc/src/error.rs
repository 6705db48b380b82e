use ircrelay_common::FromMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The line budget cannot hold even one scalar value of the text.
    #[error("line budget of {max_bytes} bytes cannot hold the next character")]
    InvalidBudget { max_bytes: usize },

    /// The `PRIVMSG <target> :` prefix alone uses up the whole line.
    #[error("target {target:?} leaves no room for text ({overhead} bytes of overhead)")]
    TargetTooLong { target: String, overhead: usize },

    /// A write failed mid-message; the remaining chunks were abandoned.
    #[error("write failed after {sent} of {total} chunks: {source}")]
    Partial {
        sent: usize,
        total: usize,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Rustls(#[from] rustls::Error),
    #[error(transparent)]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),
    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

ircrelay_common::impl_context!();
