//! Error types

use std::io;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the client
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or incomplete configuration, detected before any I/O
    #[error("configuration error: {0}")]
    Config(String),

    /// Resolving, dialing, or handshaking with the cluster failed
    #[error("failed to connect to {addr}: {source}")]
    Connection {
        /// `host:port` that was being dialed
        addr: String,
        /// Underlying I/O or TLS error
        #[source]
        source: io::Error,
    },

    /// The cluster rejected the credentials
    #[error("authentication failed: {message}")]
    Authentication {
        /// Status code from the response line, if it carried one
        status: Option<u32>,
        /// Full response line sent by the cluster
        message: String,
    },

    /// Query text rejected before being sent
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// I/O error during a query exchange
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The peer closed the stream
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The client has no open connection (never connected, or closed)
    #[error("client is not connected")]
    NotConnected,

    /// Operation not valid in the current connection state
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// Malformed data from the cluster
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Response payload is not the expected JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a connection error for `host:port`
    pub(crate) fn connection(host: &str, port: u16, source: io::Error) -> Self {
        Error::Connection {
            addr: format!("{}:{}", host, port),
            source,
        }
    }

    /// Reclassify a transport failure raised while connecting.
    ///
    /// I/O errors and malformed replies during the authentication exchange
    /// belong to `connect()`, so they surface as [`Error::Connection`] rather
    /// than [`Error::Io`] or [`Error::Protocol`].
    pub(crate) fn during_connect(self, host: &str, port: u16) -> Self {
        match self {
            Error::Io(source) => Error::connection(host, port, source),
            Error::Protocol(message) => Error::connection(
                host,
                port,
                io::Error::new(io::ErrorKind::InvalidData, message),
            ),
            Error::ConnectionClosed => Error::connection(
                host,
                port,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed during authentication",
                ),
            ),
            other => other,
        }
    }

    /// Whether this error was caused by an I/O failure on an open stream
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_) | Error::ConnectionClosed)
    }

    /// Whether the read deadline expired
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Io(e) | Error::Connection { source: e, .. } => {
                e.kind() == io::ErrorKind::TimedOut
            }
            _ => false,
        }
    }
}
