//! NNTP error types

use thiserror::Error;

/// Every failure the relay can report
#[derive(Error, Debug)]
pub enum NntpError {
    /// Socket or file I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upstream TLS setup or handshake
    #[error("TLS error: {0}")]
    Tls(String),

    /// Dial or TLS handshake took too long
    #[error("Connection timeout")]
    Timeout,

    /// Peer sent a line that does not parse against the expected grammar
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// NNTP protocol error with response code
    ///
    /// Produced client-side when the upstream answers with an unexpected
    /// status, and server-side by handlers to reply with a coded line.
    #[error("NNTP error {code}: {message}")]
    Protocol {
        code: u16,
        message: String,
    },

    /// Upstream rejected AUTHINFO credentials
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("No such newsgroup: {0}")]
    NoSuchGroup(String),

    /// Peer closed the stream mid-exchange
    #[error("Connection closed")]
    ConnectionClosed,

    /// Connection was left in an unknown state by an earlier error
    #[error("Connection broken: {0}")]
    ConnectionBroken(String),

    /// SQLite failure
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unreadable or invalid config file
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl NntpError {
    /// Status line to send to a downstream peer, if this error has one
    pub fn status_line(&self) -> Option<String> {
        match self {
            NntpError::Protocol { code, message } => Some(format!("{} {}", code, message)),
            _ => None,
        }
    }
}

/// Result type alias using NntpError
pub type Result<T> = std::result::Result<T, NntpError>;
