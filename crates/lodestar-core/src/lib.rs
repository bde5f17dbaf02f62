//! Lodestar runtime core
//!
//! Bootstrap and readiness coordination shared by the Lodestar UI and server
//! processes. Nothing in this crate renders or opens sockets; it sequences
//! work that must happen before the UI is allowed to mount.
//!
//! # Components
//!
//! - [`delay`]: suspend-for-duration primitive used by every polling loop
//! - [`mod@env`]: environment abstraction (time, sleep, randomness)
//! - [`backoff`]: retry delay policy with optional jitter
//! - [`poll`]: "check, wait, check again" loops built on the delay primitive
//! - [`readiness`]: the `Uninitialized → Initializing → Ready | Failed` state
//!   machine and the gate consumers wait on
//! - [`init`]: the one-shot runtime initializer and its setup steps
//! - [`error`]: error types for the above

pub mod backoff;
pub mod delay;
pub mod env;
pub mod error;
pub mod init;
pub mod poll;
pub mod readiness;

pub use backoff::{Backoff, Jitter};
pub use delay::{sleep, sleep_ms};
pub use env::{Environment, SystemEnv};
pub use error::{InitError, ReadinessError, StepError};
pub use init::{Capabilities, InitConfig, RuntimeInitializer, SetupStep};
pub use poll::{PollConfig, PollError, poll_until};
pub use readiness::{Readiness, ReadinessGate, ReadinessState, ReadinessTracker};
