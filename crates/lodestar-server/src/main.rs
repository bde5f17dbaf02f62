//! Lodestar server binary.
//!
//! Runs the server as a standalone process. The launcher UI either connects
//! to an already running instance or spawns this binary itself.

use std::{net::SocketAddr, process::ExitCode};

use clap::Parser;
use lodestar_server::{Server, ServerConfig, ServerError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Lodestar server process.
#[derive(Debug, Parser)]
#[command(name = "lodestar-server", version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:5012")]
    bind: SocketAddr,

    /// Log filter (overridden by RUST_LOG).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(default_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(env_filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<(), ServerError> {
    let config = ServerConfig { bind_addr: args.bind, ..ServerConfig::default() };
    let server = Server::bind(config).await?;

    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("server stopped");
    Ok(())
}
