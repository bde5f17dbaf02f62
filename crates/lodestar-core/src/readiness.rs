//! Runtime readiness state machine.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐  begin  ┌──────────────┐  complete  ┌───────┐
//! │ Uninitialized │────────>│ Initializing │───────────>│ Ready │
//! └───────────────┘         └──────────────┘            └───────┘
//!                                  │
//!                                  │ fail
//!                                  ↓
//!                             ┌────────┐
//!                             │ Failed │
//!                             └────────┘
//! ```
//!
//! `Ready` and `Failed` are terminal. Nothing resets the machine.
//!
//! [`Readiness`] is the pure machine. [`ReadinessTracker`] publishes every
//! transition over a watch channel, and [`ReadinessGate`] is the read side
//! that consumers clone and wait on.

use tokio::sync::watch;

use crate::error::{InitError, ReadinessError};

/// Readiness of the process runtime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadinessState {
    /// Nothing has started.
    #[default]
    Uninitialized,
    /// Setup steps are running.
    Initializing,
    /// All setup steps succeeded.
    Ready,
    /// A setup step failed.
    Failed {
        /// Failure description.
        reason: String,
    },
}

impl ReadinessState {
    /// `Ready` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready | Self::Failed { .. })
    }
}

/// Pure readiness state machine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readiness {
    state: ReadinessState,
}

impl Readiness {
    /// Machine in `Uninitialized`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &ReadinessState {
        &self.state
    }

    /// `Uninitialized → Initializing`.
    pub fn begin(&mut self) -> Result<(), ReadinessError> {
        self.expect_state(&ReadinessState::Uninitialized, "begin")?;
        self.state = ReadinessState::Initializing;
        Ok(())
    }

    /// `Initializing → Ready`.
    pub fn complete(&mut self) -> Result<(), ReadinessError> {
        self.expect_state(&ReadinessState::Initializing, "complete")?;
        self.state = ReadinessState::Ready;
        Ok(())
    }

    /// `Initializing → Failed`.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), ReadinessError> {
        self.expect_state(&ReadinessState::Initializing, "fail")?;
        self.state = ReadinessState::Failed { reason: reason.into() };
        Ok(())
    }

    fn expect_state(
        &self,
        expected: &ReadinessState,
        operation: &'static str,
    ) -> Result<(), ReadinessError> {
        if &self.state == expected {
            Ok(())
        } else {
            Err(ReadinessError::InvalidTransition { from: self.state.clone(), operation })
        }
    }
}

/// Owner of the process readiness state.
///
/// Transitions are applied atomically under the watch channel's lock, so two
/// concurrent `begin` calls cannot both succeed.
#[derive(Debug)]
pub struct ReadinessTracker {
    tx: watch::Sender<Readiness>,
}

impl Default for ReadinessTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessTracker {
    /// Tracker in `Uninitialized`.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Readiness::new());
        Self { tx }
    }

    /// Read side for consumers.
    pub fn gate(&self) -> ReadinessGate {
        ReadinessGate { rx: self.tx.subscribe() }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ReadinessState {
        self.tx.borrow().state().clone()
    }

    /// See [`Readiness::begin`].
    pub fn begin(&self) -> Result<(), ReadinessError> {
        self.apply(Readiness::begin)
    }

    /// See [`Readiness::complete`].
    pub fn complete(&self) -> Result<(), ReadinessError> {
        self.apply(Readiness::complete)
    }

    /// See [`Readiness::fail`].
    pub fn fail(&self, reason: impl Into<String>) -> Result<(), ReadinessError> {
        let reason = reason.into();
        self.apply(move |machine| machine.fail(reason))
    }

    fn apply<F>(&self, transition: F) -> Result<(), ReadinessError>
    where
        F: FnOnce(&mut Readiness) -> Result<(), ReadinessError>,
    {
        let mut outcome = Ok(());
        self.tx.send_if_modified(|machine| match transition(machine) {
            Ok(()) => true,
            Err(e) => {
                outcome = Err(e);
                false
            },
        });
        outcome
    }
}

/// Cloneable read side of the readiness state.
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    rx: watch::Receiver<Readiness>,
}

impl ReadinessGate {
    /// Snapshot of the current state.
    pub fn state(&self) -> ReadinessState {
        self.rx.borrow().state().clone()
    }

    /// True once the runtime reached `Ready`.
    pub fn is_ready(&self) -> bool {
        matches!(self.rx.borrow().state(), ReadinessState::Ready)
    }

    /// Suspend until the runtime reaches a terminal state.
    ///
    /// Returns `Ok(())` for `Ready`. A tracker dropped before reaching a
    /// terminal state yields [`InitError::Abandoned`].
    pub async fn wait(&self) -> Result<(), InitError> {
        let mut rx = self.rx.clone();
        let Ok(machine) = rx.wait_for(|machine| machine.state().is_terminal()).await else {
            return Err(InitError::Abandoned);
        };

        match machine.state() {
            ReadinessState::Ready => Ok(()),
            ReadinessState::Failed { reason } => Err(InitError::Failed { reason: reason.clone() }),
            ReadinessState::Uninitialized | ReadinessState::Initializing => {
                Err(InitError::Abandoned)
            },
        }
    }
}
