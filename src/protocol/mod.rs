//! CursusDB line protocol
//!
//! Every exchange is one CRLF-terminated line from the client followed by one
//! line from the cluster. This module encodes outgoing lines, splits incoming
//! bytes into lines, and interprets the status prefix of a response.

pub mod constants;
pub mod decode;
pub mod encode;
mod response;

pub use decode::decode_line;
pub use encode::{encode_auth_line, encode_query, validate_query, CredentialSeparator};
pub use response::Response;
