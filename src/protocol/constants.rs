//! CursusDB protocol constants

/// Line terminator written after every client line
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Prefix of the authentication line sent right after connecting
pub const AUTH_PREFIX: &str = "Authentication: ";

/// Every query must end with this character
pub const STATEMENT_TERMINATOR: char = ';';

/// Prefix of a successful status line
pub const SUCCESS_PREFIX: &str = "0 ";

/// Default cluster port
pub const DEFAULT_PORT: u16 = 7681;

/// Default upper bound on a single response line (16 MiB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Credential separators
pub mod separator {
    /// A single NUL byte
    pub const NUL: &[u8] = b"\0";

    /// The two characters `\` and `0`, as parsed by upstream clusters
    pub const ESCAPED: &[u8] = b"\\0";
}
