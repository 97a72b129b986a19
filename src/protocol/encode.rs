//! Protocol line encoding

use super::constants::{separator, AUTH_PREFIX, LINE_TERMINATOR, STATEMENT_TERMINATOR};
use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::{BufMut, BytesMut};

/// Byte sequence placed between username and password before base64 encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialSeparator {
    /// A single NUL byte
    #[default]
    Nul,
    /// The two characters `\0`, which upstream clusters split on
    Escaped,
}

impl CredentialSeparator {
    /// Raw bytes of the separator
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Nul => separator::NUL,
            Self::Escaped => separator::ESCAPED,
        }
    }
}

impl std::fmt::Display for CredentialSeparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nul => write!(f, "nul"),
            Self::Escaped => write!(f, "escaped"),
        }
    }
}

impl std::str::FromStr for CredentialSeparator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "nul" => Ok(Self::Nul),
            "escaped" => Ok(Self::Escaped),
            _ => Err(Error::Config(format!(
                "invalid separator '{}': expected nul or escaped",
                s
            ))),
        }
    }
}

/// Encode the authentication line, terminator included
pub fn encode_auth_line(
    username: &str,
    password: &str,
    separator: CredentialSeparator,
) -> BytesMut {
    let sep = separator.as_bytes();
    let mut credentials = Vec::with_capacity(username.len() + sep.len() + password.len());
    credentials.extend_from_slice(username.as_bytes());
    credentials.extend_from_slice(sep);
    credentials.extend_from_slice(password.as_bytes());

    let encoded = BASE64.encode(&credentials);

    let mut buf = BytesMut::with_capacity(AUTH_PREFIX.len() + encoded.len() + LINE_TERMINATOR.len());
    buf.put(AUTH_PREFIX.as_bytes());
    buf.put(encoded.as_bytes());
    buf.put(LINE_TERMINATOR);
    buf
}

/// Check that a query can be sent as a single protocol line.
///
/// The text must end with `;` and must not contain a line break, which would
/// split it into two requests on the wire.
pub fn validate_query(query: &str) -> Result<()> {
    if !query.ends_with(STATEMENT_TERMINATOR) {
        return Err(Error::InvalidQuery(format!(
            "query must end with '{}'",
            STATEMENT_TERMINATOR
        )));
    }

    if query.contains(['\r', '\n']) {
        return Err(Error::InvalidQuery(
            "query must not contain line breaks".into(),
        ));
    }

    Ok(())
}

/// Encode a query line, terminator included
pub fn encode_query(query: &str) -> Result<BytesMut> {
    validate_query(query)?;

    let mut buf = BytesMut::with_capacity(query.len() + LINE_TERMINATOR.len());
    buf.put(query.as_bytes());
    buf.put(LINE_TERMINATOR);
    Ok(buf)
}
