//! TLS configuration and support for encrypted cluster connections.
//!
//! Clusters started with TLS enabled expect the handshake immediately after the
//! TCP connect; the authentication line is then sent over the encrypted stream.

use crate::{Error, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pemfile::Item;
use std::fs;
use std::net::IpAddr;
use std::sync::Arc;

/// TLS configuration for encrypted cluster connections.
///
/// By default, server certificates are validated against the system root
/// certificates, falling back to the bundled Mozilla roots when the system
/// store is empty. The certificate must match the configured host.
///
/// # Examples
///
/// ```ignore
/// use cursusdb_wire::connection::TlsConfig;
///
/// // With system root certificates (production)
/// let tls = TlsConfig::builder().build()?;
///
/// // With custom CA certificate
/// let tls = TlsConfig::builder()
///     .ca_cert_path("/path/to/ca.pem")
///     .build()?;
///
/// // For development (danger: disables verification)
/// let tls = TlsConfig::builder()
///     .danger_accept_invalid_certs(true)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct TlsConfig {
    /// Path to CA certificate file (None = use system roots)
    ca_cert_path: Option<String>,
    /// Whether to accept invalid certificates (development only)
    danger_accept_invalid_certs: bool,
    /// Compiled rustls ClientConfig
    client_config: Arc<ClientConfig>,
}

impl TlsConfig {
    /// Create a new TLS configuration builder.
    pub fn builder() -> TlsConfigBuilder {
        TlsConfigBuilder::default()
    }

    /// Get the rustls ClientConfig for this TLS configuration.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_config.clone()
    }

    /// Path of the custom CA certificate, if one was configured.
    pub fn ca_cert_path(&self) -> Option<&str> {
        self.ca_cert_path.as_deref()
    }

    /// Check if invalid certificates are accepted (development only).
    pub fn danger_accept_invalid_certs(&self) -> bool {
        self.danger_accept_invalid_certs
    }
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("ca_cert_path", &self.ca_cert_path)
            .field(
                "danger_accept_invalid_certs",
                &self.danger_accept_invalid_certs,
            )
            .field("client_config", &"<ClientConfig>")
            .finish()
    }
}

/// Builder for TLS configuration.
#[derive(Debug, Default)]
pub struct TlsConfigBuilder {
    ca_cert_path: Option<String>,
    danger_accept_invalid_certs: bool,
}

impl TlsConfigBuilder {
    /// Set the path to a custom CA certificate file (PEM format).
    ///
    /// If not set, system root certificates will be used.
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// ⚠️ **DANGER**: Accept invalid certificates (development only).
    ///
    /// **NEVER use in production.** This disables certificate and hostname
    /// validation entirely, making the connection vulnerable to
    /// man-in-the-middle attacks. Only use for testing with self-signed
    /// certificates.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Build the TLS configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - CA certificate file cannot be read
    /// - CA certificate file holds no valid PEM certificate
    pub fn build(self) -> Result<TlsConfig> {
        let client_config = if self.danger_accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled");
            ClientConfig::builder()
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert::new()))
                .with_no_client_auth()
        } else {
            let root_store = match &self.ca_cert_path {
                Some(ca_path) => load_custom_ca(ca_path)?,
                None => load_system_roots(),
            };
            ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth()
        };

        Ok(TlsConfig {
            ca_cert_path: self.ca_cert_path,
            danger_accept_invalid_certs: self.danger_accept_invalid_certs,
            client_config: Arc::new(client_config),
        })
    }
}

/// System roots via rustls-native-certs, or the bundled webpki roots if none load.
fn load_system_roots() -> RootCertStore {
    let result = rustls_native_certs::load_native_certs();

    let mut store = RootCertStore::empty();
    let (added, _ignored) = store.add_parsable_certificates(result.certs);

    if !result.errors.is_empty() {
        tracing::debug!(errors = result.errors.len(), "errors while loading system root certificates");
    }

    if added == 0 {
        tracing::debug!("no system root certificates found, using bundled webpki roots");
        store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    store
}

/// Load a custom CA certificate from a PEM file.
fn load_custom_ca(ca_path: &str) -> Result<RootCertStore> {
    let ca_cert_data = fs::read(ca_path).map_err(|e| {
        Error::Config(format!(
            "Failed to read CA certificate file '{}': {}",
            ca_path, e
        ))
    })?;

    let mut reader = std::io::Cursor::new(&ca_cert_data);
    let mut root_store = RootCertStore::empty();
    let mut found_certs = 0;

    loop {
        match rustls_pemfile::read_one(&mut reader) {
            Ok(Some(Item::X509Certificate(cert))) => {
                let (added, _) = root_store.add_parsable_certificates(std::iter::once(cert));
                found_certs += added;
            }
            Ok(Some(_)) => {
                // Skip non-certificate items (private keys, etc.)
            }
            Ok(None) => break,
            Err(_) => {
                return Err(Error::Config(format!(
                    "Failed to parse CA certificate from '{}'",
                    ca_path
                )));
            }
        }
    }

    if found_certs == 0 {
        return Err(Error::Config(format!(
            "No valid certificates found in '{}'",
            ca_path
        )));
    }

    Ok(root_store)
}

/// Certificate verifier that accepts any server certificate.
///
/// Handshake signatures are still checked, so the peer must hold the key of
/// the certificate it presents.
#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl AcceptAnyServerCert {
    fn new() -> Self {
        let provider = CryptoProvider::get_default()
            .cloned()
            .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()));
        Self { provider }
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Parse server name from hostname for TLS SNI (Server Name Indication).
///
/// Accepts DNS names and IP addresses, without a port.
///
/// # Errors
///
/// Returns an error if the hostname is invalid.
pub fn parse_server_name(hostname: &str) -> Result<String> {
    if hostname.parse::<IpAddr>().is_ok() {
        return Ok(hostname.to_string());
    }

    // Remove trailing dot if present
    let hostname = hostname.trim_end_matches('.');

    if hostname.is_empty() || hostname.len() > 253 {
        return Err(Error::Config(format!(
            "Invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    if !hostname
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
    {
        return Err(Error::Config(format!(
            "Invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    Ok(hostname.to_string())
}
