//! Terminal host, rendering root and input driver.
//!
//! The terminal is a document with a single anchor, [`ANCHOR_ID`], covering
//! the whole screen. [`TerminalHost::create_root`] hands the terminal to the
//! root, so a second root cannot be created.
//!
//! The user's screen is left alone until the root exists: a stdout host only
//! enters raw mode and the alternate screen inside `create_root`, and the
//! root restores both when it is dropped.

use std::io::{self, Stdout, stdout};

use crossterm::{
    cursor::Show,
    event::{Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use lodestar_app::{ANCHOR_ID, Anchor, App, Driver, Host, KeyInput, RenderRoot};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{input::map_key, ui};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Terminal frontend errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The rendering backend failed.
    #[error("terminal backend error: {0}")]
    Backend(#[source] BoxError),

    /// The terminal only exposes the application anchor.
    #[error("terminal has no anchor `{id}`")]
    UnknownAnchor {
        /// Requested anchor.
        id: String,
    },

    /// A root already owns the terminal.
    #[error("anchor `{id}` already has a rendering root")]
    RootExists {
        /// Anchor that is already mounted.
        id: String,
    },
}

/// Raw mode and alternate screen, restored on drop.
#[derive(Debug)]
struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    fn enter() -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!(error = %e, "failed to disable raw mode");
        }
        if let Err(e) = execute!(stdout(), LeaveAlternateScreen, Show) {
            warn!(error = %e, "failed to leave alternate screen");
        }
    }
}

/// Host document backed by a ratatui terminal.
#[derive(Debug)]
pub struct TerminalHost<B: Backend> {
    terminal: Option<Terminal<B>>,
    take_over_screen: bool,
}

impl<B: Backend> TerminalHost<B> {
    /// Host drawing into `terminal` as is.
    pub fn new(terminal: Terminal<B>) -> Self {
        Self { terminal: Some(terminal), take_over_screen: false }
    }
}

impl TerminalHost<CrosstermBackend<Stdout>> {
    /// Host on the process stdout.
    ///
    /// Raw mode and the alternate screen are entered when the root is
    /// created, not here.
    pub fn stdout() -> Result<Self, TerminalError> {
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { terminal: Some(terminal), take_over_screen: true })
    }
}

impl<B> Host for TerminalHost<B>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    type Root = TerminalRoot<B>;
    type Error = TerminalError;

    fn find_anchor(&self, id: &str) -> Option<Anchor> {
        (id == ANCHOR_ID).then(|| Anchor::new(id))
    }

    fn create_root(&mut self, anchor: Anchor) -> Result<TerminalRoot<B>, TerminalError> {
        if anchor.id() != ANCHOR_ID {
            return Err(TerminalError::UnknownAnchor { id: anchor.id().to_string() });
        }
        let Some(mut terminal) = self.terminal.take() else {
            return Err(TerminalError::RootExists { id: anchor.id().to_string() });
        };

        let screen = if self.take_over_screen { Some(RawModeGuard::enter()?) } else { None };
        terminal.clear().map_err(|e| TerminalError::Backend(Box::new(e)))?;

        debug!(anchor = anchor.id(), raw_mode = screen.is_some(), "terminal root created");
        Ok(TerminalRoot { anchor, terminal, _screen: screen })
    }
}

/// Rendering root owning the terminal.
///
/// Dropping the root restores the screen if the host took it over.
#[derive(Debug)]
pub struct TerminalRoot<B: Backend> {
    anchor: Anchor,
    terminal: Terminal<B>,
    _screen: Option<RawModeGuard>,
}

impl<B: Backend> TerminalRoot<B> {
    /// Underlying terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B> RenderRoot for TerminalRoot<B>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    type Error = TerminalError;

    fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    fn render(&mut self, app: &App) -> Result<(), TerminalError> {
        self.terminal
            .draw(|frame| ui::draw(frame, app))
            .map_err(|e| TerminalError::Backend(Box::new(e)))?;
        Ok(())
    }
}

/// Key input from the crossterm event stream.
pub struct TerminalDriver {
    events: EventStream,
}

impl std::fmt::Debug for TerminalDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalDriver").finish_non_exhaustive()
    }
}

impl Default for TerminalDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDriver {
    /// Driver reading from the process terminal.
    pub fn new() -> Self {
        Self { events: EventStream::new() }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn next_key(&mut self) -> Result<Option<KeyInput>, TerminalError> {
        while let Some(event) = self.events.next().await {
            match event? {
                Event::Key(key) => {
                    if let Some(key) = map_key(key) {
                        return Ok(Some(key));
                    }
                },
                other => debug!(event = ?other, "ignoring terminal event"),
            }
        }
        Ok(None)
    }
}
