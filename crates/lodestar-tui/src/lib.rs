//! Terminal UI for Lodestar
//!
//! A thin shell over [`lodestar_app`] that provides terminal-specific I/O:
//! a ratatui [`TerminalHost`] exposing the `"app"` anchor, a crossterm
//! [`TerminalDriver`] feeding keys to the runtime, and the [`ui::draw`]
//! layout. All orchestration lives in [`lodestar_app::Entry`] and
//! [`lodestar_app::Runtime`].

pub mod input;
pub mod terminal;
pub mod ui;

pub use input::map_key;
pub use terminal::{TerminalDriver, TerminalError, TerminalHost, TerminalRoot};
