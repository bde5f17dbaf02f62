//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Port the launcher UI connects to when none is configured.
pub const DEFAULT_PORT: u16 = 5012;

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,
    /// Version string reported in `HelloReply`.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
