//! Runtime initializer.
//!
//! [`RuntimeInitializer::init_runtime`] runs every registered [`SetupStep`]
//! once, in registration order, and drives the process readiness state:
//!
//! ```text
//! init_runtime()
//!   ├─► begin()            Uninitialized → Initializing (else rejected)
//!   ├─► for step in steps
//!   │     ├─ Ok  ─► next step
//!   │     └─ Err ─► fail() Initializing → Failed, return StepFailed
//!   └─► complete()         Initializing → Ready, return Capabilities
//! ```
//!
//! Failure is fast and terminal. There is no retry at this layer; a step
//! that wants to wait for something (a server coming up) composes
//! [`crate::poll_until`] itself.

use std::{fmt, time::Duration};

use anymap2::Map;
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, info_span};

use crate::{
    error::{InitError, ReadinessError, StepError},
    readiness::{ReadinessGate, ReadinessState, ReadinessTracker},
};

type CapabilityMap = Map<dyn anymap2::any::Any + Send + Sync>;

/// Typed values installed by setup steps.
///
/// Holds at most one value per type. Steps read what earlier steps installed
/// and the mounted application receives the full set once the runtime is
/// ready.
pub struct Capabilities {
    values: CapabilityMap,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new()
    }
}

impl Capabilities {
    /// Empty set.
    pub fn new() -> Self {
        Self { values: CapabilityMap::new() }
    }

    /// Install `value`, returning the previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.values.insert(value)
    }

    /// Shared access to the value of type `T`.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.values.get::<T>()
    }

    /// Exclusive access to the value of type `T`.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.values.get_mut::<T>()
    }

    /// Take the value of type `T` out of the set.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.values.remove::<T>()
    }

    /// Whether a value of type `T` is installed.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.values.contains::<T>()
    }

    /// Number of installed values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").field("len", &self.values.len()).finish()
    }
}

/// One unit of process setup.
#[async_trait]
pub trait SetupStep: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Perform the step, installing whatever it provides into `capabilities`.
    async fn run(&self, capabilities: &mut Capabilities) -> Result<(), StepError>;
}

/// Initializer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitConfig {
    /// Upper bound for a single step. `None` lets a step run indefinitely.
    pub step_timeout: Option<Duration>,
}

/// One-shot process initializer.
pub struct RuntimeInitializer {
    config: InitConfig,
    steps: Vec<Box<dyn SetupStep>>,
    readiness: ReadinessTracker,
}

impl fmt::Debug for RuntimeInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let steps: Vec<&str> = self.steps.iter().map(|step| step.name()).collect();
        f.debug_struct("RuntimeInitializer")
            .field("config", &self.config)
            .field("steps", &steps)
            .field("state", &self.readiness.state())
            .finish()
    }
}

impl Default for RuntimeInitializer {
    fn default() -> Self {
        Self::new(InitConfig::default())
    }
}

impl RuntimeInitializer {
    /// Initializer with no steps.
    pub fn new(config: InitConfig) -> Self {
        Self { config, steps: Vec::new(), readiness: ReadinessTracker::new() }
    }

    /// Append a setup step. Steps run in the order they are added.
    #[must_use]
    pub fn step(mut self, step: impl SetupStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Read side of the readiness state.
    pub fn gate(&self) -> ReadinessGate {
        self.readiness.gate()
    }

    /// Current readiness state.
    pub fn state(&self) -> ReadinessState {
        self.readiness.state()
    }

    /// Run all setup steps and move the runtime to `Ready` or `Failed`.
    ///
    /// Only the first call runs anything. Later calls are rejected according
    /// to the current state and never re-run steps.
    pub async fn init_runtime(&self) -> Result<Capabilities, InitError> {
        if let Err(rejected) = self.readiness.begin() {
            let ReadinessError::InvalidTransition { from, .. } = rejected;
            return Err(match from {
                ReadinessState::Ready => InitError::AlreadyInitialized,
                ReadinessState::Failed { reason } => InitError::Failed { reason },
                ReadinessState::Uninitialized | ReadinessState::Initializing => {
                    InitError::InProgress
                },
            });
        }

        let started = Instant::now();
        info!(steps = self.steps.len(), "initializing runtime");

        let mut capabilities = Capabilities::new();
        for step in &self.steps {
            if let Err(source) = self.run_step(step.as_ref(), &mut capabilities).await {
                let step = step.name().to_string();
                if let Err(e) = self.readiness.fail(format!("{step}: {source}")) {
                    error!(error = %e, "readiness rejected failure transition");
                }
                error!(
                    %step,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "runtime initialization failed"
                );
                return Err(InitError::StepFailed { step, source });
            }
        }

        if let Err(e) = self.readiness.complete() {
            error!(error = %e, "readiness rejected completion");
            return Err(InitError::Abandoned);
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            capabilities = capabilities.len(),
            "runtime ready"
        );
        Ok(capabilities)
    }

    async fn run_step(
        &self,
        step: &dyn SetupStep,
        capabilities: &mut Capabilities,
    ) -> Result<(), StepError> {
        let span = info_span!("setup_step", step = step.name());
        async {
            let started = Instant::now();
            debug!("step started");

            let result = match self.config.step_timeout {
                Some(limit) => match tokio::time::timeout(limit, step.run(capabilities)).await {
                    Ok(result) => result,
                    Err(_) => Err(StepError::TimedOut(limit)),
                },
                None => step.run(capabilities).await,
            };

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => debug!(elapsed_ms, "step finished"),
                Err(e) => error!(elapsed_ms, error = %e, "step failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
