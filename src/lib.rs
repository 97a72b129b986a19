//! cursusdb-wire: an async client for CursusDB clusters
//!
//! The cluster speaks a line-oriented text protocol, optionally wrapped in TLS:
//!
//! ```text
//! C: Authentication: <base64(username SEP password)>\r\n
//! S: 0 Authentication successful.\r\n
//! C: select * from users;\r\n
//! S: [{"user": {...}}]\r\n
//! ```
//!
//! A client authenticates once on connect, then sends one query line at a time
//! and reads back exactly one response line. Responses are returned verbatim;
//! [`Response`] offers a parsed view of the status prefix.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> cursusdb_wire::Result<()> {
//! use cursusdb_wire::{ConnectionConfig, CursusClient};
//!
//! let config = ConnectionConfig::new("db.example.com", 7681)
//!     .credentials("admin", "secret")
//!     .tls(true);
//!
//! let mut client = CursusClient::new(config);
//! client.connect().await?;
//!
//! let line = client.query("select * from users;").await?;
//! println!("{}", line);
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod protocol;

pub use client::CursusClient;
pub use connection::{ConnectionConfig, TlsConfig};
pub use error::{Error, Result};
pub use protocol::{CredentialSeparator, Response};
