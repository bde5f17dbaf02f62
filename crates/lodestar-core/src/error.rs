//! Error types for readiness tracking and runtime initialization.

use std::time::Duration;

use thiserror::Error;

use crate::readiness::ReadinessState;

/// Rejected readiness transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadinessError {
    /// The requested transition is not allowed from the current state.
    #[error("cannot {operation} from state {from:?}")]
    InvalidTransition {
        /// State the machine was in.
        from: ReadinessState,
        /// Transition that was attempted.
        operation: &'static str,
    },
}

/// Failure of a single setup step.
#[derive(Debug, Error)]
pub enum StepError {
    /// The step ran and reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The step exceeded the configured per-step timeout.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// A capability installed by an earlier step was not found.
    #[error("missing capability: {0}")]
    MissingCapability(&'static str),

    /// Underlying error from the step's own machinery.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl StepError {
    /// Wrap an arbitrary error.
    pub fn other<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(error))
    }
}

/// Runtime initialization did not reach `Ready`.
#[derive(Debug, Error)]
pub enum InitError {
    /// A setup step failed; later steps were not run.
    #[error("setup step `{step}` failed: {source}")]
    StepFailed {
        /// Name of the failing step.
        step: String,
        /// What went wrong.
        #[source]
        source: StepError,
    },

    /// The runtime already reached `Ready`; initialization runs once.
    #[error("runtime already initialized")]
    AlreadyInitialized,

    /// Another caller is currently initializing the runtime.
    #[error("runtime initialization already in progress")]
    InProgress,

    /// Initialization previously failed. Failure is terminal.
    #[error("runtime initialization failed: {reason}")]
    Failed {
        /// Failure description recorded when the runtime failed.
        reason: String,
    },

    /// The initializer was dropped before reaching a terminal state.
    #[error("runtime initializer dropped before completion")]
    Abandoned,
}

impl InitError {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::StepFailed { .. } => "init_step_failed",
            Self::AlreadyInitialized => "init_already_initialized",
            Self::InProgress => "init_in_progress",
            Self::Failed { .. } => "init_failed",
            Self::Abandoned => "init_abandoned",
        }
    }
}
