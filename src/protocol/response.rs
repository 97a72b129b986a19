//! Parsed view of a response line

use super::constants::SUCCESS_PREFIX;
use crate::Result;
use serde::de::DeserializeOwned;

/// A response line with its status prefix parsed once.
///
/// The cluster prefixes status lines with a decimal code and a space
/// (`0 Authentication successful.`). Query results may carry no prefix at all,
/// in which case [`status`](Response::status) is `None` and the payload is the
/// whole line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    line: String,
    status: Option<u32>,
    payload_start: usize,
}

impl Response {
    /// Parse a response line (without terminator)
    pub fn parse(line: impl Into<String>) -> Self {
        let line = line.into();
        let (status, payload_start) = match parse_status_prefix(&line) {
            Some((code, len)) => (Some(code), len),
            None => (None, 0),
        };
        Self {
            line,
            status,
            payload_start,
        }
    }

    /// Status code, if the line starts with `<digits> `
    pub fn status(&self) -> Option<u32> {
        self.status
    }

    /// Whether the line starts with the success prefix `0 `
    pub fn is_success(&self) -> bool {
        self.line.starts_with(SUCCESS_PREFIX)
    }

    /// Text after the status prefix, or the whole line if there is none
    pub fn payload(&self) -> &str {
        &self.line[self.payload_start..]
    }

    /// The line exactly as received
    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Consume the response, returning the line exactly as received
    pub fn into_string(self) -> String {
        self.line
    }

    /// Deserialize the payload as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(self.payload())?)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line)
    }
}

impl AsRef<str> for Response {
    fn as_ref(&self) -> &str {
        &self.line
    }
}

impl From<Response> for String {
    fn from(response: Response) -> Self {
        response.line
    }
}

/// Returns the code and the byte length of the prefix including its space
fn parse_status_prefix(line: &str) -> Option<(u32, usize)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || line.as_bytes().get(digits) != Some(&b' ') {
        return None;
    }
    let code = line[..digits].parse().ok()?;
    Some((code, digits + 1))
}
