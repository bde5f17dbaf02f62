//! Setup steps run by the runtime initializer before the UI mounts.
//!
//! Each step leaves what it produced in the [`Capabilities`] map:
//!
//! | Step              | Installs          |
//! |-------------------|-------------------|
//! | [`InstallShims`]  | [`LauncherInfo`]  |
//! | [`SpawnServer`]   | [`ServerProcess`] |
//! | [`ConnectServer`] | [`Session`], [`ServerInfo`] |

use std::{
    net::SocketAddr,
    path::PathBuf,
    process::Stdio,
    sync::{Mutex, PoisonError},
    time::{Duration, SystemTime},
};

use async_trait::async_trait;
use lodestar_core::{Capabilities, PollConfig, SetupStep, StepError, SystemEnv, poll_until};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::{app::ServerInfo, session::Session};

/// Launcher identity, installed before anything else runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherInfo {
    /// Launcher build version.
    pub version: String,
    /// Client name sent in the handshake.
    pub client: String,
    /// Wall-clock time the launcher started initializing.
    pub started_at: SystemTime,
}

/// Records [`LauncherInfo`] in the capabilities.
#[derive(Debug, Clone)]
pub struct InstallShims {
    client: String,
}

impl InstallShims {
    /// Shims for a launcher announcing itself as `client`.
    pub fn new(client: impl Into<String>) -> Self {
        Self { client: client.into() }
    }
}

#[async_trait]
impl SetupStep for InstallShims {
    fn name(&self) -> &str {
        "install_shims"
    }

    async fn run(&self, capabilities: &mut Capabilities) -> Result<(), StepError> {
        capabilities.insert(LauncherInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            client: self.client.clone(),
            started_at: SystemTime::now(),
        });
        Ok(())
    }
}

/// Server child process owned by the launcher.
///
/// The process is killed when this value is dropped.
#[derive(Debug)]
pub struct ServerProcess {
    pid: Option<u32>,
    child: Mutex<Child>,
}

impl ServerProcess {
    /// OS process id, if the process is still running.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Kill the process and wait for it to exit.
    pub async fn shutdown(self) -> std::io::Result<()> {
        let mut child = self.child.into_inner().unwrap_or_else(PoisonError::into_inner);
        child.kill().await
    }
}

/// Spawns the server binary as a child process.
#[derive(Debug, Clone)]
pub struct SpawnServer {
    program: PathBuf,
    args: Vec<String>,
}

impl SpawnServer {
    /// Spawn `program` with `args`.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }
}

#[async_trait]
impl SetupStep for SpawnServer {
    fn name(&self) -> &str {
        "spawn_server"
    }

    async fn run(&self, capabilities: &mut Capabilities) -> Result<(), StepError> {
        // Output is discarded: the server shares our terminal otherwise.
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                StepError::Failed(format!("cannot spawn {}: {e}", self.program.display()))
            })?;

        if let Some(status) = child.try_wait().map_err(StepError::other)? {
            return Err(StepError::Failed(format!("server exited immediately: {status}")));
        }

        let pid = child.id();
        info!(program = %self.program.display(), pid, "server process spawned");
        capabilities.insert(ServerProcess { pid, child: Mutex::new(child) });
        Ok(())
    }
}

/// Connects to the server, retrying with backoff until it accepts.
///
/// Each attempt (TCP connect plus handshake) is bounded by the attempt
/// timeout, so a peer that accepts and then stays silent counts as a failed
/// attempt.
#[derive(Debug, Clone)]
pub struct ConnectServer {
    addr: SocketAddr,
    poll: PollConfig,
    client: String,
    attempt_timeout: Duration,
}

impl ConnectServer {
    /// Default bound on a single connect attempt.
    pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Connect to `addr`, announcing the launcher as `client`.
    pub fn new(addr: SocketAddr, poll: PollConfig, client: impl Into<String>) -> Self {
        Self {
            addr,
            poll,
            client: client.into(),
            attempt_timeout: Self::DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    /// Bound each attempt by `timeout`.
    #[must_use]
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }
}

#[async_trait]
impl SetupStep for ConnectServer {
    fn name(&self) -> &str {
        "connect_server"
    }

    async fn run(&self, capabilities: &mut Capabilities) -> Result<(), StepError> {
        let addr = self.addr;
        let limit = self.attempt_timeout;
        let session = poll_until(&SystemEnv, &self.poll, |attempt| {
            let client = self.client.clone();
            async move {
                debug!(%addr, attempt, "connecting to server");
                Session::connect_within(addr, &client, limit).await
            }
        })
        .await
        .map_err(StepError::other)?;

        capabilities.insert(ServerInfo {
            addr: addr.to_string(),
            session_id: session.session_id(),
            version: session.server_version().to_string(),
        });
        capabilities.insert(session);
        Ok(())
    }
}
