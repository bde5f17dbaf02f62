//! TCP listener and connection loop.

use std::{future::Future, net::SocketAddr, sync::Arc};

use lodestar_core::{Environment, SystemEnv};
use lodestar_proto::{ProtocolError, read_message, write_message};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    config::ServerConfig,
    error::ServerError,
    session::{ServerAction, ServerSession, ServerState},
};

/// Bound Lodestar server.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl Server {
    /// Bind the listener described by `config`.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ServerError::Bind { addr: config.bind_addr, source })?;

        let state = Arc::new(ServerState::new(SystemEnv, config.version));
        Ok(Self { listener, state })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Each connection runs on its own task. Sessions still open at shutdown
    /// are left to finish on their own.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!(%addr, version = self.state.version(), "server listening");

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown requested, no longer accepting connections");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let state = Arc::clone(&self.state);
                        let span = info_span!("connection", %peer);
                        tokio::spawn(
                            async move {
                                if let Err(e) = handle_connection(stream, state).await {
                                    warn!(error = %e, "connection ended with error");
                                }
                            }
                            .instrument(span),
                        );
                    },
                    Err(e) => warn!(error = %e, "accept failed"),
                },
            }
        }
    }
}

/// Drive one connection until the session closes or the peer disconnects.
pub async fn handle_connection<S, E>(
    stream: S,
    state: Arc<ServerState<E>>,
) -> Result<(), ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    E: Environment,
{
    let (mut reader, mut writer) = tokio::io::split(stream);
    let _open = state.open_session();
    let mut session = ServerSession::new();

    loop {
        let message = match read_message(&mut reader).await {
            Ok(message) => message,
            Err(ProtocolError::ConnectionClosed) => {
                debug!("peer disconnected");
                return Ok(());
            },
            Err(e) => return Err(e.into()),
        };

        for action in session.handle(message, &state) {
            match action {
                ServerAction::Reply(reply) => write_message(&mut writer, &reply).await?,
                ServerAction::Close { reason } => {
                    debug!(%reason, "closing session");
                    return Ok(());
                },
            }
        }
    }
}
