//! Application layer for the Lodestar launcher
//!
//! Everything the UI process needs between "process started" and "user is
//! typing", independent of any particular rendering surface.
//!
//! # Components
//!
//! - [`Entry`]: awaits runtime initialization, then mounts the application
//!   into the host's anchor exactly once
//! - [`Host`] / [`RenderRoot`]: the rendering surface the entry point mounts
//!   into, implemented by each frontend
//! - [`Session`]: client side of the connection to the server process
//! - [`steps`]: setup steps that spawn and connect to the server
//! - [`App`]: root application component state
//! - [`Runtime`]: post-mount event loop over a [`Driver`]

mod action;
mod app;
pub mod commands;
mod driver;
mod entry;
mod host;
mod input;
mod runtime;
mod session;
pub mod steps;

pub use action::AppAction;
pub use app::{App, ServerInfo};
pub use driver::Driver;
pub use entry::{Entry, EntryError, Mounted};
pub use host::{ANCHOR_ID, Anchor, Host, RenderRoot};
pub use input::{InputEvent, KeyInput, TextInput};
pub use runtime::{Runtime, RuntimeError};
pub use session::{Session, SessionError};
