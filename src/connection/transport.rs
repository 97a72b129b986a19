//! Transport abstraction (TCP with optional TLS)

use super::tls::{parse_server_name, TlsConfig};
use crate::{Error, Result};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

/// Transport layer: a TCP stream, plain or TLS-encrypted
#[allow(clippy::large_enum_variant)]
pub enum Transport {
    /// Plain TCP connection
    Plain(TcpStream),
    /// TLS-encrypted TCP connection
    Tls(tokio_rustls::client::TlsStream<TcpStream>),
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Plain(_) => f.write_str("Transport::Plain(TcpStream)"),
            Transport::Tls(_) => f.write_str("Transport::Tls(TlsStream)"),
        }
    }
}

impl Transport {
    /// Connect via plain TCP
    pub async fn connect_tcp(host: &str, port: u16) -> Result<Self> {
        let stream = dial(host, port).await?;
        Ok(Transport::Plain(stream))
    }

    /// Connect via TLS-encrypted TCP, using `host` as the TLS server name
    pub async fn connect_tcp_tls(host: &str, port: u16, tls_config: &TlsConfig) -> Result<Self> {
        // Parse server name for TLS handshake (SNI) before touching the network
        let server_name = parse_server_name(host)?;
        let server_name = rustls_pki_types::ServerName::try_from(server_name)
            .map_err(|_| Error::Config(format!("Invalid hostname for TLS: {}", host)))?;

        let tcp_stream = dial(host, port).await?;

        let tls_connector = tokio_rustls::TlsConnector::from(tls_config.client_config());
        let tls_stream = tls_connector
            .connect(server_name, tcp_stream)
            .await
            .map_err(|e| Error::connection(host, port, e))?;

        tracing::debug!("TLS handshake complete");
        Ok(Transport::Tls(tls_stream))
    }

    /// Whether the stream is TLS-encrypted
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }
}

/// Resolve and open a TCP stream
async fn dial(host: &str, port: u16) -> Result<TcpStream> {
    let stream = TcpStream::connect((host, port))
        .await
        .map_err(|e| Error::connection(host, port, e))?;
    // One short line per request; don't wait to coalesce
    stream
        .set_nodelay(true)
        .map_err(|e| Error::connection(host, port, e))?;
    Ok(stream)
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Transport::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Transport::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Transport::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Transport::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}
