//! Connection management
//!
//! This module handles:
//! * Transport abstraction (plain TCP vs TLS)
//! * Connection lifecycle (authentication, query exchange, close)
//! * State machine enforcement
//! * TLS configuration and support

mod conn;
mod state;
mod tls;
mod transport;

pub use conn::{Connection, ConnectionConfig, ConnectionConfigBuilder, DEFAULT_READ_TIMEOUT};
pub use state::ConnectionState;
pub use tls::{parse_server_name, TlsConfig, TlsConfigBuilder};
pub use transport::Transport;
