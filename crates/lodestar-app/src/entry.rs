//! UI entry point.
//!
//! ```text
//! Entry::start
//!   ├─► init_runtime().await        suspends until Ready or Failed
//!   │       └─ Failed ─► EntryError::Initialization, host untouched
//!   ├─► find_anchor("app")          MissingAnchor if absent
//!   ├─► create_root(anchor)         exactly one root
//!   └─► build app + first render    mounted
//! ```
//!
//! Everything after the initializer resolves is synchronous. With no await
//! point between readiness and mount, no other task can run in between.

use lodestar_core::{Capabilities, InitError, ReadinessGate, RuntimeInitializer};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    app::App,
    host::{ANCHOR_ID, Host, RenderRoot},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Startup failed; nothing is mounted.
#[derive(Debug, Error)]
pub enum EntryError {
    /// Runtime initialization did not reach `Ready`.
    #[error("runtime initialization failed: {0}")]
    Initialization(#[source] InitError),

    /// The host has no anchor with the well-known identifier.
    #[error("mount anchor `{id}` not found in host document")]
    MissingAnchor {
        /// Identifier that was looked up.
        id: String,
    },

    /// The host refused to create a root.
    #[error("host could not create rendering root: {0}")]
    Host(#[source] BoxError),

    /// First render of the mounted tree failed.
    #[error("initial render failed: {0}")]
    Render(#[source] BoxError),
}

/// Application mounted into its rendering root.
#[derive(Debug)]
pub struct Mounted<R> {
    /// Root the application is bound to.
    pub root: R,
    /// Mounted application state.
    pub app: App,
    /// Capabilities installed during initialization.
    pub capabilities: Capabilities,
    /// Readiness of the runtime (always `Ready` here).
    pub gate: ReadinessGate,
}

/// One-shot startup sequence for the UI process.
///
/// [`Entry::start`] consumes the entry, so a single entry creates at most one
/// rendering root.
#[derive(Debug)]
pub struct Entry<H> {
    host: H,
    initializer: RuntimeInitializer,
}

impl<H: Host> Entry<H> {
    /// Entry mounting into `host` once `initializer` succeeds.
    pub fn new(host: H, initializer: RuntimeInitializer) -> Self {
        Self { host, initializer }
    }

    /// Readiness gate of the wrapped initializer.
    pub fn gate(&self) -> ReadinessGate {
        self.initializer.gate()
    }

    /// Initialize the runtime, then mount the application built by `build`.
    ///
    /// `build` receives the initialized capabilities and may take values out
    /// of them.
    pub async fn start<F>(self, build: F) -> Result<Mounted<H::Root>, EntryError>
    where
        F: FnOnce(&mut Capabilities) -> App,
    {
        let Self { mut host, initializer } = self;
        let gate = initializer.gate();

        let mut capabilities = initializer.init_runtime().await.map_err(|e| {
            error!(error = %e, label = e.as_label(), "not mounting: runtime is not ready");
            EntryError::Initialization(e)
        })?;

        let anchor = host
            .find_anchor(ANCHOR_ID)
            .ok_or_else(|| EntryError::MissingAnchor { id: ANCHOR_ID.to_string() })?;

        let mut root = host.create_root(anchor).map_err(|e| EntryError::Host(Box::new(e)))?;

        let app = build(&mut capabilities);
        root.render(&app).map_err(|e| EntryError::Render(Box::new(e)))?;

        info!(anchor = root.anchor().id(), "application mounted");
        Ok(Mounted { root, app, capabilities, gate })
    }
}
