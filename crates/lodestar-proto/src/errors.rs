//! Protocol error types.

use thiserror::Error;

/// Convenience alias for protocol results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while encoding, decoding or transporting frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Header did not start with the Lodestar magic number.
    #[error("invalid magic number: {found:#010x}")]
    BadMagic {
        /// Value found in the magic field.
        found: u32,
    },

    /// Frame was produced by an incompatible protocol revision.
    #[error("unsupported frame version {version}")]
    UnsupportedVersion {
        /// Version byte found in the header.
        version: u8,
    },

    /// Payload length exceeds [`crate::FrameHeader::MAX_PAYLOAD_SIZE`].
    #[error("payload of {size} bytes exceeds limit of {max} bytes")]
    PayloadTooLarge {
        /// Declared or actual payload size.
        size: usize,
        /// Maximum accepted payload size.
        max: usize,
    },

    /// Buffer ended before a complete frame was available.
    #[error("truncated frame: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to finish the frame.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// Payload could not be (de)serialized as CBOR.
    #[error("cbor error: {0}")]
    Cbor(String),

    /// Underlying stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Peer closed the stream on a frame boundary.
    #[error("connection closed by peer")]
    ConnectionClosed,
}
