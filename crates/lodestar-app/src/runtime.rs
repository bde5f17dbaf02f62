//! Post-mount event loop.
//!
//! Races user input against a status refresh timer, feeds keys to the
//! [`crate::App`], executes the resulting [`AppAction`]s against the server
//! session and re-renders through the mounted root.

use std::time::Duration;

use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{
    action::AppAction,
    driver::Driver,
    entry::Mounted,
    host::RenderRoot,
    session::Session,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Runtime loop failure.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Input backend failed.
    #[error("input driver failed: {0}")]
    Driver(#[source] BoxError),

    /// Rendering failed.
    #[error("render failed: {0}")]
    Render(#[source] BoxError),
}

/// Event loop over a mounted application.
#[derive(Debug)]
pub struct Runtime<D, R> {
    driver: D,
    mounted: Mounted<R>,
    refresh: Duration,
}

impl<D, R> Runtime<D, R>
where
    D: Driver,
    R: RenderRoot,
{
    /// Shortest accepted refresh interval.
    pub const MIN_REFRESH: Duration = Duration::from_millis(1);

    /// Runtime refreshing the server status every `refresh`.
    ///
    /// Intervals shorter than [`Runtime::MIN_REFRESH`] are raised to it.
    pub fn new(driver: D, mounted: Mounted<R>, refresh: Duration) -> Self {
        if refresh < Self::MIN_REFRESH {
            debug!(refresh_ms = refresh.as_millis() as u64, "refresh interval raised to minimum");
        }
        Self { driver, mounted, refresh: refresh.max(Self::MIN_REFRESH) }
    }

    /// Run until the user quits or input ends. Returns the mounted tree.
    pub async fn run(mut self) -> Result<Mounted<R>, RuntimeError> {
        let mut ticker = tokio::time::interval(self.refresh);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick fires immediately, so status is fetched before
            // any input is processed.
            let actions = tokio::select! {
                biased;

                _ = ticker.tick() => vec![AppAction::RequestStatus, AppAction::Render],
                key = self.driver.next_key() => match key {
                    Ok(Some(key)) => self.mounted.app.handle_key(key),
                    Ok(None) => {
                        debug!("input closed");
                        break;
                    },
                    Err(e) => return Err(RuntimeError::Driver(Box::new(e))),
                },
            };

            if self.execute(actions).await? {
                break;
            }
        }

        if let Some(session) = self.mounted.capabilities.remove::<Session>()
            && let Err(e) = session.goodbye("launcher closed").await
        {
            warn!(error = %e, "failed to close server session");
        }

        info!("runtime stopped");
        Ok(self.mounted)
    }

    /// Execute actions; returns `true` when the loop should stop.
    async fn execute(&mut self, actions: Vec<AppAction>) -> Result<bool, RuntimeError> {
        for action in actions {
            match action {
                AppAction::Quit => return Ok(true),
                AppAction::Render => {
                    self.mounted
                        .root
                        .render(&self.mounted.app)
                        .map_err(|e| RuntimeError::Render(Box::new(e)))?;
                },
                AppAction::RequestStatus => {
                    let Some(session) = self.mounted.capabilities.get_mut::<Session>() else {
                        self.mounted.app.set_notice("not connected to a server");
                        continue;
                    };
                    match session.status().await {
                        Ok(status) => self.mounted.app.apply_status(status),
                        Err(e) => {
                            warn!(error = %e, "status request failed");
                            self.mounted.app.set_notice(format!("status failed: {e}"));
                        },
                    }
                },
                AppAction::Ping => {
                    let Some(session) = self.mounted.capabilities.get_mut::<Session>() else {
                        self.mounted.app.set_notice("not connected to a server");
                        continue;
                    };
                    match session.ping().await {
                        Ok(latency) => self.mounted.app.apply_latency(latency),
                        Err(e) => {
                            warn!(error = %e, "ping failed");
                            self.mounted.app.set_notice(format!("ping failed: {e}"));
                        },
                    }
                },
            }
        }
        Ok(false)
    }
}
