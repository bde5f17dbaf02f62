//! Client side of the UI ↔ server connection.

use std::net::SocketAddr;

use lodestar_proto::{
    Hello, Message, PROTOCOL_VERSION, ProtocolError, StatusReply, read_message, write_message,
};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    time::{Duration, Instant},
};
use tracing::{debug, info};

/// Errors talking to the server.
#[derive(Debug, Error)]
pub enum SessionError {
    /// TCP connection could not be opened.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Server address.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Connect and handshake did not finish in time.
    #[error("no handshake from {addr} within {after:?}")]
    TimedOut {
        /// Server address.
        addr: SocketAddr,
        /// Time allowed for the attempt.
        after: Duration,
    },

    /// Framing or transport failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Server ended the session.
    #[error("server closed the session: {reason}")]
    Rejected {
        /// Reason given by the server.
        reason: String,
    },

    /// Server answered with the wrong message.
    #[error("expected {expected}, got {got}")]
    Unexpected {
        /// Message kind that was expected.
        expected: &'static str,
        /// Message kind that arrived.
        got: &'static str,
    },

    /// `Pong` did not echo the `Ping` nonce.
    #[error("pong nonce {got} does not match ping nonce {sent}")]
    NonceMismatch {
        /// Nonce sent.
        sent: u64,
        /// Nonce received.
        got: u64,
    },
}

/// Established session with the server process.
#[derive(Debug)]
pub struct Session<S = TcpStream> {
    stream: S,
    session_id: u64,
    server_version: String,
    next_nonce: u64,
}

impl Session<TcpStream> {
    /// Open a TCP connection to `addr` and perform the handshake.
    pub async fn connect(addr: SocketAddr, client: &str) -> Result<Self, SessionError> {
        let stream =
            TcpStream::connect(addr).await.map_err(|source| SessionError::Connect { addr, source })?;
        stream.set_nodelay(true).map_err(|source| SessionError::Connect { addr, source })?;
        Self::handshake(stream, client).await
    }

    /// [`Session::connect`], failing with [`SessionError::TimedOut`] if the
    /// server does not complete the handshake within `limit`.
    pub async fn connect_within(
        addr: SocketAddr,
        client: &str,
        limit: Duration,
    ) -> Result<Self, SessionError> {
        match tokio::time::timeout(limit, Self::connect(addr, client)).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::TimedOut { addr, after: limit }),
        }
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Perform the `Hello` handshake over an already open stream.
    pub async fn handshake(mut stream: S, client: &str) -> Result<Self, SessionError> {
        let hello = Message::Hello(Hello { version: PROTOCOL_VERSION, client: client.to_string() });
        write_message(&mut stream, &hello).await?;

        match read_message(&mut stream).await? {
            Message::HelloReply(reply) => {
                info!(
                    session_id = reply.session_id,
                    server_version = %reply.server_version,
                    "connected to server"
                );
                Ok(Self {
                    stream,
                    session_id: reply.session_id,
                    server_version: reply.server_version,
                    next_nonce: 1,
                })
            },
            Message::Goodbye { reason } => Err(SessionError::Rejected { reason }),
            other => Err(SessionError::Unexpected { expected: "hello_reply", got: other.kind() }),
        }
    }

    /// Identifier assigned by the server.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Server build version.
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Send a `Ping` and return the round-trip time.
    pub async fn ping(&mut self) -> Result<Duration, SessionError> {
        let nonce = self.next_nonce;
        self.next_nonce = self.next_nonce.wrapping_add(1);

        let sent = Instant::now();
        match self.request(Message::Ping { nonce }).await? {
            Message::Pong { nonce: got } if got == nonce => Ok(sent.elapsed()),
            Message::Pong { nonce: got } => Err(SessionError::NonceMismatch { sent: nonce, got }),
            other => Err(SessionError::Unexpected { expected: "pong", got: other.kind() }),
        }
    }

    /// Fetch a status snapshot.
    pub async fn status(&mut self) -> Result<StatusReply, SessionError> {
        match self.request(Message::Status).await? {
            Message::StatusReply(status) => Ok(status),
            other => Err(SessionError::Unexpected { expected: "status_reply", got: other.kind() }),
        }
    }

    /// Close the session politely.
    pub async fn goodbye(mut self, reason: &str) -> Result<(), SessionError> {
        debug!(session_id = self.session_id, %reason, "closing session");
        write_message(&mut self.stream, &Message::Goodbye { reason: reason.to_string() }).await?;
        Ok(())
    }

    async fn request(&mut self, message: Message) -> Result<Message, SessionError> {
        write_message(&mut self.stream, &message).await?;
        match read_message(&mut self.stream).await? {
            Message::Goodbye { reason } => Err(SessionError::Rejected { reason }),
            reply => Ok(reply),
        }
    }
}
