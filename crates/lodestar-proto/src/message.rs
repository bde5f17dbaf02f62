//! Messages exchanged between the UI and server processes.
//!
//! # Protocol Flow
//!
//! ```text
//! UI                               Server
//!  │ ── Hello ───────────────────────> │
//!  │ <─────────────────── HelloReply ── │   session established
//!  │ ── Ping { nonce } ──────────────> │
//!  │ <────────────── Pong { nonce } ─── │
//!  │ ── Status ──────────────────────> │
//!  │ <─────────────────── StatusReply ─ │
//!  │ ── Goodbye ─────────────────────> │   server closes the stream
//! ```

use serde::{Deserialize, Serialize};

/// Opening message sent by the UI process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// Protocol version the client speaks.
    pub version: u8,

    /// Free-form client name, used for server-side logging.
    pub client: String,
}

/// Server response completing the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloReply {
    /// Identifier assigned to this session by the server.
    pub session_id: u64,

    /// Version string of the server build.
    pub server_version: String,
}

/// Server health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReply {
    /// Milliseconds since the server started accepting connections.
    pub uptime_ms: u64,

    /// Number of currently open sessions, including the caller's.
    pub sessions: u64,
}

/// A single protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Client handshake.
    Hello(Hello),

    /// Server handshake reply.
    HelloReply(HelloReply),

    /// Liveness check.
    Ping {
        /// Echoed back in the matching `Pong`.
        nonce: u64,
    },

    /// Liveness reply.
    Pong {
        /// Nonce from the `Ping` being answered.
        nonce: u64,
    },

    /// Request a [`StatusReply`].
    Status,

    /// Server health snapshot.
    StatusReply(StatusReply),

    /// Orderly close; the receiver ends the session.
    Goodbye {
        /// Human-readable reason.
        reason: String,
    },
}

impl Message {
    /// Short stable name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello(_) => "hello",
            Self::HelloReply(_) => "hello_reply",
            Self::Ping { .. } => "ping",
            Self::Pong { .. } => "pong",
            Self::Status => "status",
            Self::StatusReply(_) => "status_reply",
            Self::Goodbye { .. } => "goodbye",
        }
    }
}
