//! Server error types.

use std::net::SocketAddr;

use lodestar_proto::ProtocolError;
use thiserror::Error;

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Socket-level failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer sent something that is not a valid frame.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
