//! Client session and connect step against a real server.

mod common;

use std::{net::SocketAddr, time::Duration};

use common::{local_config, start_server};
use lodestar_app::{ServerInfo, Session, SessionError, steps::ConnectServer};
use lodestar_core::{Backoff, InitError, PollConfig, RuntimeInitializer, StepError};
use lodestar_server::ServerConfig;
use tokio::net::TcpListener;

async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn quick_poll(max_attempts: u32) -> PollConfig {
    PollConfig {
        backoff: Backoff::constant(Duration::from_millis(20)),
        max_attempts: Some(max_attempts),
    }
}

#[tokio::test]
async fn session_round_trips() {
    let (addr, stop, handle) = start_server(local_config()).await;

    let mut session = Session::connect(addr, "session-test").await.unwrap();
    assert_eq!(session.server_version(), "test");

    session.ping().await.unwrap();
    let status = session.status().await.unwrap();
    assert_eq!(status.sessions, 1);
    session.goodbye("done").await.unwrap();

    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn connect_to_closed_port_fails() {
    let addr = unused_addr().await;
    let result = Session::connect(addr, "session-test").await;
    assert!(matches!(result, Err(SessionError::Connect { addr: a, .. }) if a == addr));
}

#[tokio::test]
async fn connect_step_retries_until_server_is_up() {
    let addr = unused_addr().await;

    let late_server = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        start_server(ServerConfig { bind_addr: addr, version: "late".into() }).await
    });

    let connect = ConnectServer::new(addr, quick_poll(100), "session-test");
    let initializer = RuntimeInitializer::default().step(connect);
    let mut caps = initializer.init_runtime().await.unwrap();

    let info = caps.remove::<ServerInfo>().unwrap();
    assert_eq!(info.version, "late");
    assert_eq!(info.addr, addr.to_string());
    assert!(caps.contains::<Session>());

    let (_, stop, handle) = late_server.await.unwrap();
    drop(caps);
    stop.send(()).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn connect_step_gives_up() {
    let addr = unused_addr().await;
    let connect = ConnectServer::new(addr, quick_poll(3), "session-test");
    let initializer = RuntimeInitializer::default().step(connect);

    let result = initializer.init_runtime().await;

    assert!(matches!(
        result,
        Err(InitError::StepFailed { ref step, source: StepError::Other(_) }) if step == "connect_server"
    ));
}

/// Accepts connections and holds them open without ever answering.
async fn silent_listener() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    (addr, handle)
}

#[tokio::test]
async fn silent_server_times_out_each_attempt() {
    let (addr, listener) = silent_listener().await;

    let result = Session::connect_within(addr, "session-test", Duration::from_millis(50)).await;
    assert!(matches!(result, Err(SessionError::TimedOut { addr: a, .. }) if a == addr));

    listener.abort();
}

#[tokio::test]
async fn connect_step_exhausts_against_silent_server() {
    let (addr, listener) = silent_listener().await;
    let connect = ConnectServer::new(addr, quick_poll(3), "session-test")
        .attempt_timeout(Duration::from_millis(50));
    let initializer = RuntimeInitializer::default().step(connect);
    let gate = initializer.gate();

    let outcome = tokio::time::timeout(Duration::from_secs(5), initializer.init_runtime())
        .await
        .expect("initializer stalled on a silent server");

    match outcome {
        Err(InitError::StepFailed { step, source }) => {
            assert_eq!(step, "connect_server");
            assert!(source.to_string().contains("gave up after 3 attempts"));
            assert!(source.to_string().contains("no handshake"));
        },
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(gate.state(), lodestar_core::ReadinessState::Failed { .. }));

    listener.abort();
}
