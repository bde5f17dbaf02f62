//! Lodestar launcher binary.
//!
//! Brings up the runtime (optionally spawning the server), mounts the
//! application into the terminal once the runtime is ready, and runs the
//! event loop until the user quits.

use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Mutex,
    time::Duration,
};

use clap::Parser;
use lodestar_app::{
    App, Entry, EntryError, Mounted, Runtime, RuntimeError, ServerInfo,
    steps::{ConnectServer, InstallShims, ServerProcess, SpawnServer},
};
use lodestar_core::{InitConfig, PollConfig, RuntimeInitializer};
use lodestar_tui::{TerminalDriver, TerminalError, TerminalHost};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CLIENT_NAME: &str = "lodestar-tui";

/// Lodestar terminal launcher.
#[derive(Debug, Parser)]
#[command(name = "lodestar", version, about)]
struct Args {
    /// Server address to connect to.
    #[arg(long, default_value = "127.0.0.1:5012")]
    server: SocketAddr,

    /// Spawn this server binary before connecting.
    #[arg(long, value_name = "PATH")]
    spawn_server: Option<PathBuf>,

    /// Connection attempts before giving up.
    #[arg(long, default_value_t = 20)]
    connect_attempts: u32,

    /// Fail a setup step that runs longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    step_timeout: Option<u64>,

    /// Status refresh interval in milliseconds.
    #[arg(long, default_value_t = 1000)]
    refresh_ms: u64,

    /// Log file; the terminal itself is used for the UI.
    #[arg(long, default_value = "lodestar.log")]
    log_file: PathBuf,
}

#[derive(Debug, Error)]
enum LaunchError {
    #[error(transparent)]
    Terminal(#[from] TerminalError),

    #[error(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn init_tracing(log_file: &Path) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            info!(path = %log_file.display(), "logging initialized");
        },
        // No logs rather than log lines drawn over the UI.
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn initializer(args: &Args) -> RuntimeInitializer {
    let config = InitConfig { step_timeout: args.step_timeout.map(Duration::from_secs) };
    let mut initializer = RuntimeInitializer::new(config).step(InstallShims::new(CLIENT_NAME));

    if let Some(program) = &args.spawn_server {
        let bind = vec!["--bind".to_string(), args.server.to_string()];
        initializer = initializer.step(SpawnServer::new(program.clone(), bind));
    }

    let poll = PollConfig { max_attempts: Some(args.connect_attempts), ..PollConfig::default() };
    initializer.step(ConnectServer::new(args.server, poll, CLIENT_NAME))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_file);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "launcher exited with error");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<(), LaunchError> {
    let initializer = initializer(&args);
    let refresh = Duration::from_millis(args.refresh_ms);

    // The screen stays in cooked mode until the root is created, so Ctrl-C
    // still reaches us while the runtime initializes.
    let entry = Entry::new(TerminalHost::stdout()?, initializer);
    let mounted = tokio::select! {
        mounted = entry.start(|caps| App::new(caps.remove::<ServerInfo>())) => mounted?,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted during startup");
            return Ok(());
        },
    };

    let Mounted { root, mut capabilities, .. } =
        Runtime::new(TerminalDriver::new(), mounted, refresh).run().await?;
    drop(root);

    if let Some(server) = capabilities.remove::<ServerProcess>() {
        info!(pid = server.pid(), "stopping spawned server");
        if let Err(e) = server.shutdown().await {
            warn!(error = %e, "failed to stop spawned server");
        }
    }

    info!("launcher stopped");
    Ok(())
}
