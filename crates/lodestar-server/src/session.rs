//! Per-connection session state machine.
//!
//! # Architecture: Action-Based State Machine
//!
//! [`ServerSession::handle`] takes one inbound message and returns the
//! actions the caller must execute. It performs no I/O, so the protocol
//! rules are tested without sockets.
//!
//! ```text
//! ┌───────────────┐  Hello (matching version)  ┌─────────────┐
//! │ AwaitingHello │───────────────────────────>│ Established │
//! └───────────────┘                            └─────────────┘
//!         │ anything else                             │ Goodbye / protocol violation
//!         ↓                                           ↓
//!    ┌────────┐                                  ┌────────┐
//!    │ Closed │<─────────────────────────────────│ Closed │
//!    └────────┘                                  └────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use lodestar_core::{Environment, SystemEnv};
use lodestar_proto::{HelloReply, Message, PROTOCOL_VERSION, StatusReply};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Actions returned by [`ServerSession::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAction {
    /// Send this message to the peer.
    Reply(Message),

    /// End the session.
    Close {
        /// Why the session ends.
        reason: String,
    },
}

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connection accepted, waiting for `Hello`.
    AwaitingHello,
    /// Handshake complete.
    Established {
        /// Identifier assigned in the `HelloReply`.
        session_id: u64,
    },
    /// Session ended.
    Closed,
}

/// State shared by every session of one server.
#[derive(Debug)]
pub struct ServerState<E: Environment = SystemEnv> {
    env: E,
    version: String,
    started: Instant,
    open_sessions: AtomicU64,
}

impl<E: Environment> ServerState<E> {
    /// Fresh state; uptime counts from now.
    pub fn new(env: E, version: impl Into<String>) -> Self {
        let started = env.now();
        Self { env, version: version.into(), started, open_sessions: AtomicU64::new(0) }
    }

    /// Version reported to clients.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Current health snapshot.
    pub fn status(&self) -> StatusReply {
        StatusReply {
            uptime_ms: (self.env.now() - self.started).as_millis() as u64,
            sessions: self.open_sessions.load(Ordering::Relaxed),
        }
    }

    /// Random identifier for a new session.
    pub fn assign_session_id(&self) -> u64 {
        self.env.random_u64()
    }

    /// Count a connection as open until the returned guard drops.
    pub fn open_session(&self) -> SessionGuard<'_> {
        self.open_sessions.fetch_add(1, Ordering::Relaxed);
        SessionGuard { counter: &self.open_sessions }
    }
}

/// Keeps a connection counted in [`ServerState::status`].
#[derive(Debug)]
pub struct SessionGuard<'a> {
    counter: &'a AtomicU64,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Protocol state machine for one connection.
#[derive(Debug, Clone)]
pub struct ServerSession {
    phase: SessionPhase,
}

impl Default for ServerSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerSession {
    /// Session waiting for `Hello`.
    pub fn new() -> Self {
        Self { phase: SessionPhase::AwaitingHello }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Process one inbound message.
    pub fn handle<E: Environment>(
        &mut self,
        message: Message,
        state: &ServerState<E>,
    ) -> Vec<ServerAction> {
        match (self.phase, message) {
            (SessionPhase::Closed, _) => Vec::new(),

            (SessionPhase::AwaitingHello, Message::Hello(hello)) => {
                if hello.version != PROTOCOL_VERSION {
                    warn!(client = %hello.client, version = hello.version, "unsupported protocol version");
                    return self.reject(format!("unsupported protocol version {}", hello.version));
                }

                let session_id = state.assign_session_id();
                self.phase = SessionPhase::Established { session_id };
                info!(client = %hello.client, session_id, "session established");

                vec![ServerAction::Reply(Message::HelloReply(HelloReply {
                    session_id,
                    server_version: state.version().to_string(),
                }))]
            },

            (SessionPhase::AwaitingHello, other) => {
                warn!(kind = other.kind(), "message before handshake");
                self.reject(format!("expected hello, got {}", other.kind()))
            },

            (SessionPhase::Established { .. }, Message::Ping { nonce }) => {
                vec![ServerAction::Reply(Message::Pong { nonce })]
            },

            (SessionPhase::Established { .. }, Message::Status) => {
                vec![ServerAction::Reply(Message::StatusReply(state.status()))]
            },

            (SessionPhase::Established { session_id }, Message::Goodbye { reason }) => {
                debug!(session_id, %reason, "client said goodbye");
                self.phase = SessionPhase::Closed;
                vec![ServerAction::Close { reason }]
            },

            (SessionPhase::Established { session_id }, other) => {
                warn!(session_id, kind = other.kind(), "unexpected message");
                self.reject(format!("unexpected {}", other.kind()))
            },
        }
    }

    fn reject(&mut self, reason: String) -> Vec<ServerAction> {
        self.phase = SessionPhase::Closed;
        vec![
            ServerAction::Reply(Message::Goodbye { reason: reason.clone() }),
            ServerAction::Close { reason },
        ]
    }
}
