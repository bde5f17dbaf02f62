//! Lodestar server
//!
//! The standalone process the launcher UI attaches to. It is built and
//! started independently of the UI and speaks only the
//! [`lodestar_proto`] wire protocol.
//!
//! # Components
//!
//! - [`ServerSession`]: per-connection protocol state machine (no I/O)
//! - [`ServerState`]: shared counters and identity for all sessions
//! - [`Server`]: TCP listener executing session actions

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod server;
pub mod session;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{Server, handle_connection};
pub use session::{ServerAction, ServerSession, ServerState, SessionPhase};
