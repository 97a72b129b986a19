//! Label keys and values

use crate::Error;

/// Outcome label key
pub const RESULT: &str = "result";
/// Query status label key
pub const STATUS: &str = "status";
/// Error kind label key
pub const ERROR_KIND: &str = "error_kind";

/// Connection attempted
pub const RESULT_ATTEMPTED: &str = "attempted";
/// Connection established or authentication accepted
pub const RESULT_SUCCESS: &str = "success";
/// Connection or authentication failed
pub const RESULT_FAILURE: &str = "failure";

/// Query exchange completed
pub const STATUS_OK: &str = "ok";
/// Query exchange failed
pub const STATUS_ERROR: &str = "error";

/// Low-cardinality label value for an error
pub fn error_kind(err: &Error) -> &'static str {
    match err {
        Error::Config(_) => "config",
        Error::Connection { .. } => "connection",
        Error::Authentication { .. } => "authentication",
        Error::InvalidQuery(_) => "invalid_query",
        Error::Io(_) => "io",
        Error::ConnectionClosed => "connection_closed",
        Error::NotConnected => "not_connected",
        Error::InvalidState { .. } => "invalid_state",
        Error::Protocol(_) => "protocol",
        Error::Json(_) => "json",
    }
}
