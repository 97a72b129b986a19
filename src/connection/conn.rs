//! Core connection type

use super::state::ConnectionState;
use super::transport::Transport;
use crate::protocol::constants::{DEFAULT_MAX_LINE_LENGTH, DEFAULT_PORT};
use crate::protocol::{decode_line, encode_auth_line, encode_query, CredentialSeparator, Response};
use crate::{Error, Result};
use bytes::BytesMut;
use std::io;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default read deadline applied to every response line
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection configuration
///
/// Stores the cluster address, credentials, and timeouts. Use
/// `ConnectionConfig::builder()` for a fluent alternative.
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Cluster host name or address
    pub host: String,
    /// Cluster port
    pub port: u16,
    /// Username
    pub username: String,
    /// Password
    pub password: String,
    /// Wrap the connection in TLS
    pub tls: bool,
    /// Deadline for reading one response line (default: 5 seconds, None = wait forever)
    pub read_timeout: Option<Duration>,
    /// Deadline for resolve, dial, and TLS handshake (default: None)
    pub connect_timeout: Option<Duration>,
    /// Separator between username and password in the authentication line
    pub credential_separator: CredentialSeparator,
    /// Longest response line accepted, in bytes
    pub max_line_length: usize,
}

impl ConnectionConfig {
    /// Create new configuration with defaults
    ///
    /// # Defaults
    ///
    /// - `username`, `password`: empty
    /// - `tls`: false
    /// - `read_timeout`: 5 seconds
    /// - `connect_timeout`: None
    /// - `credential_separator`: NUL
    /// - `max_line_length`: 16 MiB
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: String::new(),
            password: String::new(),
            tls: false,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            connect_timeout: None,
            credential_separator: CredentialSeparator::default(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Create a builder for advanced configuration
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let config = ConnectionConfig::builder("localhost", 7681)
    ///     .username("admin")
    ///     .password("secret")
    ///     .read_timeout(Duration::from_secs(10))
    ///     .build();
    /// ```
    pub fn builder(host: impl Into<String>, port: u16) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder {
            config: Self::new(host, port),
        }
    }

    /// Set username and password
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Enable or disable TLS
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    /// Set the read deadline (`None` waits forever)
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check that a connection can be attempted.
    ///
    /// Fails if the host is empty or the port is zero.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config("cluster host is required".into()));
        }
        if self.port == 0 {
            return Err(Error::Config("cluster port is required".into()));
        }
        if self.max_line_length == 0 {
            return Err(Error::Config("max_line_length must be positive".into()));
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT)
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("tls", &self.tls)
            .field("read_timeout", &self.read_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("credential_separator", &self.credential_separator)
            .field("max_line_length", &self.max_line_length)
            .finish()
    }
}

/// Builder for creating `ConnectionConfig`
#[derive(Debug, Clone)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Set the username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Set the password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.password = password.into();
        self
    }

    /// Enable or disable TLS
    pub fn tls(mut self, enabled: bool) -> Self {
        self.config.tls = enabled;
        self
    }

    /// Set the read deadline for each response line
    ///
    /// Default: 5 seconds
    pub fn read_timeout(mut self, duration: Duration) -> Self {
        self.config.read_timeout = Some(duration);
        self
    }

    /// Wait forever for response lines
    pub fn no_read_timeout(mut self) -> Self {
        self.config.read_timeout = None;
        self
    }

    /// Set the deadline for resolve, dial, and TLS handshake
    ///
    /// Default: None (OS default)
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.config.connect_timeout = Some(duration);
        self
    }

    /// Set the credential separator
    pub fn credential_separator(mut self, separator: CredentialSeparator) -> Self {
        self.config.credential_separator = separator;
        self
    }

    /// Set the longest accepted response line, in bytes
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.config.max_line_length = bytes;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}

/// An authenticated line-protocol connection over stream `S`.
///
/// At most one request is in flight: every exchange writes one line and reads
/// exactly one line back before the call returns. A failed exchange closes the
/// connection, since the next line on the wire would belong to the failed
/// request.
pub struct Connection<S = Transport> {
    stream: Option<S>,
    state: ConnectionState,
    read_buf: BytesMut,
    read_timeout: Option<Duration>,
    max_line_length: usize,
}

impl<S> std::fmt::Debug for Connection<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.state)
            .field("buffered", &self.read_buf.len())
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create connection from an open stream
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            state: ConnectionState::Initial,
            read_buf: BytesMut::with_capacity(8192),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Get current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the connection is authenticated and ready for a query
    pub fn is_idle(&self) -> bool {
        self.state == ConnectionState::Idle
    }

    /// Send the authentication line and check the cluster's verdict.
    ///
    /// Adopts the read deadline and line limit from `config`. On any failure
    /// the stream is released and the connection is closed.
    pub async fn authenticate(&mut self, config: &ConnectionConfig) -> Result<()> {
        self.read_timeout = config.read_timeout;
        self.max_line_length = config.max_line_length;

        self.state.transition(ConnectionState::Authenticating)?;

        let result = self.exchange_auth(config).await;
        match &result {
            Ok(()) => {
                self.state.transition(ConnectionState::Idle)?;
                tracing::debug!("authentication successful");
                crate::metrics::counters::auth_successful();
            }
            Err(e) => {
                tracing::debug!(error = %e, "authentication failed");
                crate::metrics::counters::auth_failed();
                self.abandon();
            }
        }
        result
    }

    async fn exchange_auth(&mut self, config: &ConnectionConfig) -> Result<()> {
        let line = encode_auth_line(
            &config.username,
            &config.password,
            config.credential_separator,
        );
        self.write_line(&line).await?;

        let response = Response::parse(self.read_line().await?);
        if response.is_success() {
            Ok(())
        } else {
            Err(Error::Authentication {
                status: response.status(),
                message: response.into_string(),
            })
        }
    }

    /// Send one query line and return the response line verbatim.
    ///
    /// The query must end with `;`; otherwise this fails with
    /// [`Error::InvalidQuery`] without touching the stream.
    pub async fn query(&mut self, query: &str) -> Result<String> {
        let line = encode_query(query)?;

        if self.state == ConnectionState::Closed {
            return Err(Error::ConnectionClosed);
        }
        self.state.transition(ConnectionState::QueryInProgress)?;

        let start = Instant::now();
        let result = self.exchange(&line).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => {
                self.state.transition(ConnectionState::Idle)?;
                tracing::debug!(elapsed_ms, "query complete");
                crate::metrics::counters::query_completed(crate::metrics::labels::STATUS_OK);
            }
            Err(e) => {
                tracing::warn!(error = %e, "query failed, closing connection");
                crate::metrics::counters::query_completed(crate::metrics::labels::STATUS_ERROR);
                self.abandon();
            }
        }
        crate::metrics::histograms::query_duration(elapsed_ms);
        result
    }

    async fn exchange(&mut self, line: &[u8]) -> Result<String> {
        self.write_line(line).await?;
        self.read_line().await
    }

    /// Close the connection.
    ///
    /// Closing twice is a no-op. The stream is released even if the shutdown
    /// handshake fails.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == ConnectionState::Closed {
            return Ok(());
        }
        self.state.transition(ConnectionState::Closed)?;
        self.read_buf.clear();

        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await?;
        }
        tracing::debug!("connection closed");
        Ok(())
    }

    /// Drop the stream without a shutdown handshake
    fn abandon(&mut self) {
        self.state = ConnectionState::Closed;
        self.stream = None;
        self.read_buf.clear();
    }

    async fn write_line(&mut self, line: &[u8]) -> Result<()> {
        let stream = self.stream.as_mut().ok_or(Error::ConnectionClosed)?;
        stream.write_all(line).await?;
        stream.flush().await?;
        Ok(())
    }

    /// Read one line, bounded by the read deadline
    async fn read_line(&mut self) -> Result<String> {
        match self.read_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.read_line_unbounded())
                .await
                .map_err(|_| {
                    Error::Io(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("no response line within {:?}", timeout),
                    ))
                })?,
            None => self.read_line_unbounded().await,
        }
    }

    async fn read_line_unbounded(&mut self) -> Result<String> {
        loop {
            if let Some(line) = decode_line(&mut self.read_buf, self.max_line_length)? {
                return Ok(line);
            }

            // Need more data
            let stream = self.stream.as_mut().ok_or(Error::ConnectionClosed)?;
            let n = stream.read_buf(&mut self.read_buf).await?;
            if n == 0 {
                return Err(Error::ConnectionClosed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn test_config() -> ConnectionConfig {
        ConnectionConfig::new("localhost", 7681).credentials("admin", "secret")
    }

    // base64("admin\0secret")
    const AUTH_LINE: &[u8] = b"Authentication: YWRtaW4Ac2VjcmV0\r\n";

    #[test]
    fn test_connection_config_defaults() {
        let config = ConnectionConfig::new("db.example.com", 7681);

        assert_eq!(config.host, "db.example.com");
        assert_eq!(config.port, 7681);
        assert!(config.username.is_empty());
        assert!(config.password.is_empty());
        assert!(!config.tls);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(5)));
        assert!(config.connect_timeout.is_none());
        assert_eq!(config.credential_separator, CredentialSeparator::Nul);
        assert_eq!(config.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert_eq!(config.address(), "db.example.com:7681");
    }

    #[test]
    fn test_connection_config_builder_fluent() {
        let config = ConnectionConfig::builder("db.example.com", 7682)
            .username("admin")
            .password("secret")
            .tls(true)
            .read_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(3))
            .credential_separator(CredentialSeparator::Escaped)
            .max_line_length(1024)
            .build();

        assert_eq!(config.username, "admin");
        assert_eq!(config.password, "secret");
        assert!(config.tls);
        assert_eq!(config.read_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(3)));
        assert_eq!(config.credential_separator, CredentialSeparator::Escaped);
        assert_eq!(config.max_line_length, 1024);
    }

    #[test]
    fn test_connection_config_builder_no_read_timeout() {
        let config = ConnectionConfig::builder("localhost", 7681)
            .no_read_timeout()
            .build();
        assert!(config.read_timeout.is_none());
    }

    #[test]
    fn test_validate_requires_host_and_port() {
        assert!(matches!(
            ConnectionConfig::new("", 7681).validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ConnectionConfig::new("   ", 7681).validate(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ConnectionConfig::new("localhost", 0).validate(),
            Err(Error::Config(_))
        ));
        assert!(ConnectionConfig::new("localhost", 7681).validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = test_config();
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("admin"));
        assert!(!debug_str.contains("secret"));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 Authentication successful.\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"1 bad credentials\r\n")
            .build();

        let mut conn = Connection::new(mock);
        let err = conn.authenticate(&test_config()).await.unwrap_err();
        match err {
            Error::Authentication { status, message } => {
                assert_eq!(status, Some(1));
                assert_eq!(message, "1 bad credentials");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_authenticate_peer_closed() {
        let mock = Builder::new().write(AUTH_LINE).build();

        let mut conn = Connection::new(mock);
        let err = conn.authenticate(&test_config()).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_authenticate_twice_rejected() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();
        let err = conn.authenticate(&test_config()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_query_returns_line_verbatim() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .write(b"select * from x;\r\n")
            .read(b"0 {\"result\":[]}\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();

        let line = conn.query("select * from x;").await.unwrap();
        assert_eq!(line, r#"0 {"result":[]}"#);
        assert!(conn.is_idle());
    }

    #[tokio::test]
    async fn test_query_response_split_across_reads() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .write(b"select * from users;\r\n")
            .read(b"[{\"user\":")
            .read(b"{\"name\":\"alex\"}}]\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();

        let line = conn.query("select * from users;").await.unwrap();
        assert_eq!(line, r#"[{"user":{"name":"alex"}}]"#);
    }

    #[tokio::test]
    async fn test_invalid_query_performs_no_io() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();

        // The mock panics on any write it was not told to expect
        let err = conn.query("select * from x").await.unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
        assert!(conn.is_idle());
    }

    #[tokio::test]
    async fn test_query_before_authentication() {
        let mock = Builder::new().build();

        let mut conn = Connection::new(mock);
        let err = conn.query("select * from x;").await.unwrap_err();
        assert!(matches!(err, Error::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_query_failure_closes_connection() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .write(b"select * from x;\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();

        let err = conn.query("select * from x;").await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert_eq!(conn.state(), ConnectionState::Closed);

        let err = conn.query("select * from x;").await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_read_error_is_io() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .write(b"select * from x;\r\n")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();

        let err = conn.query("select * from x;").await.unwrap_err();
        match err {
            Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_oversized_response_rejected() {
        let config = ConnectionConfig::builder("localhost", 7681)
            .username("admin")
            .password("secret")
            .max_line_length(8)
            .build();

        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .write(b"select * from x;\r\n")
            .read(b"0 this line is far too long\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&config).await.unwrap();

        let err = conn.query("select * from x;").await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert_eq!(conn.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mock = Builder::new()
            .write(AUTH_LINE)
            .read(b"0 OK\r\n")
            .build();

        let mut conn = Connection::new(mock);
        conn.authenticate(&test_config()).await.unwrap();

        conn.close().await.unwrap();
        assert_eq!(conn.state(), ConnectionState::Closed);
        conn.close().await.unwrap();

        let err = conn.query("select * from x;").await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_read_timeout() {
        let (client, _server) = tokio::io::duplex(64);
        let config = ConnectionConfig::builder("localhost", 7681)
            .read_timeout(Duration::from_millis(50))
            .build();

        let mut conn = Connection::new(client);
        // The server half never answers
        let err = conn.authenticate(&config).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(conn.state(), ConnectionState::Closed);
    }
}
