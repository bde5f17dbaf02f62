//! Application actions
//!
//! Actions produced by the [`crate::App`] state machine for the runtime to
//! execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Redraw the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Ask the server for a status snapshot.
    RequestStatus,

    /// Measure round-trip time to the server.
    Ping,
}
