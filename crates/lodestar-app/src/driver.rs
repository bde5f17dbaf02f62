//! Driver trait for abstracting input.
//!
//! The [`Driver`] trait decouples the post-mount [`crate::Runtime`] from a
//! specific terminal or windowing backend. Tests drive the runtime with a
//! scripted key sequence.

use std::future::Future;

use crate::input::KeyInput;

/// Source of user input for the runtime.
pub trait Driver {
    /// Backend-specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Wait for the next key press.
    ///
    /// Returns `Ok(None)` once input is exhausted. Must be cancel-safe: the
    /// runtime races it against its refresh timer.
    fn next_key(&mut self) -> impl Future<Output = Result<Option<KeyInput>, Self::Error>>;
}
