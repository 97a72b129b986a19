//! High-level client API

mod connection_string;
mod cursus_client;

pub use connection_string::ConnectionInfo;
pub use cursus_client::CursusClient;
