//! Wire format spoken between the Lodestar UI process and the server process.
//!
//! The two artifacts are launched independently, so they share nothing but
//! this protocol. Every message travels as a frame: a fixed 12-byte header
//! followed by a CBOR payload.
//!
//! ```text
//! ┌──────────────┬─────────┬──────────┬──────────────────┬───────────────┐
//! │ magic "LDST" │ version │ reserved │ payload len (BE) │ CBOR payload  │
//! │   4 bytes    │ 1 byte  │ 3 bytes  │     4 bytes      │  len bytes    │
//! └──────────────┴─────────┴──────────┴──────────────────┴───────────────┘
//! ```
//!
//! Payloads are capped at [`FrameHeader::MAX_PAYLOAD_SIZE`]. The header is
//! validated before any payload byte is read or allocated.
#![forbid(unsafe_code)]

pub mod codec;
pub mod errors;
pub mod header;
pub mod message;

pub use codec::{decode, encode, read_message, write_message};
pub use errors::{ProtocolError, Result};
pub use header::FrameHeader;
pub use message::{Hello, HelloReply, Message, StatusReply};

/// Protocol version carried in the `Hello` handshake.
pub const PROTOCOL_VERSION: u8 = 1;
