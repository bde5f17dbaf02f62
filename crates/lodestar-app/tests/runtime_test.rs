//! Event loop tests, offline and against a real server.

mod common;

use std::{
    future::{Future, ready},
    net::SocketAddr,
    time::Duration,
};

use common::{FakeHost, FakeRoot, Scripted, local_config, start_server};
use lodestar_app::{
    ANCHOR_ID, App, Driver, Entry, KeyInput, Mounted, Runtime, RuntimeError, ServerInfo, Session,
    steps::ConnectServer,
};
use lodestar_core::{Backoff, PollConfig, RuntimeInitializer};

const IDLE_REFRESH: Duration = Duration::from_secs(3600);

async fn mount_offline() -> Mounted<FakeRoot> {
    Entry::new(FakeHost::with_anchors(&[ANCHOR_ID]), RuntimeInitializer::default())
        .start(|_| App::new(None))
        .await
        .unwrap()
}

async fn mount_connected(addr: SocketAddr) -> Mounted<FakeRoot> {
    let poll = PollConfig {
        backoff: Backoff::constant(Duration::from_millis(10)),
        max_attempts: Some(5),
    };
    let initializer =
        RuntimeInitializer::default().step(ConnectServer::new(addr, poll, "runtime-test"));

    Entry::new(FakeHost::with_anchors(&[ANCHOR_ID]), initializer)
        .start(|caps| App::new(caps.remove::<ServerInfo>()))
        .await
        .unwrap()
}

#[tokio::test]
async fn typed_lines_become_entries() {
    let mounted = mount_offline().await;
    let driver = Scripted::keys(
        "milk".chars().map(KeyInput::Char).chain([KeyInput::Enter]).chain(
            "eggs".chars().map(KeyInput::Char).chain([KeyInput::Enter]),
        ),
    );

    let mounted = Runtime::new(driver, mounted, IDLE_REFRESH).run().await.unwrap();

    assert_eq!(mounted.app.entries(), ["milk".to_string(), "eggs".to_string()]);
    assert_eq!(mounted.root.last_entries, mounted.app.entries());
    assert!(mounted.root.renders > 1);
}

#[tokio::test]
async fn status_without_session_sets_notice() {
    let mounted = mount_offline().await;
    let mounted =
        Runtime::new(Scripted::line("/status"), mounted, IDLE_REFRESH).run().await.unwrap();

    assert_eq!(mounted.app.notice(), Some("not connected to a server"));
    assert!(mounted.app.status().is_none());
}

#[tokio::test]
async fn escape_stops_before_remaining_input() {
    let mounted = mount_offline().await;
    let driver = Scripted::keys([KeyInput::Esc, KeyInput::Char('x'), KeyInput::Enter]);

    let mounted = Runtime::new(driver, mounted, IDLE_REFRESH).run().await.unwrap();

    assert!(mounted.app.should_quit());
    assert!(mounted.app.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn zero_refresh_interval_is_accepted() {
    let mounted = mount_offline().await;

    let mounted =
        Runtime::new(Scripted::line("tick"), mounted, Duration::ZERO).run().await.unwrap();

    assert_eq!(mounted.app.entries(), ["tick".to_string()]);
}

#[derive(Debug, thiserror::Error)]
#[error("terminal went away")]
struct Gone;

struct Broken;

impl Driver for Broken {
    type Error = Gone;

    fn next_key(&mut self) -> impl Future<Output = Result<Option<KeyInput>, Gone>> {
        ready(Err(Gone))
    }
}

#[tokio::test]
async fn driver_failure_ends_the_loop() {
    let mounted = mount_offline().await;
    let result = Runtime::new(Broken, mounted, IDLE_REFRESH).run().await;
    assert!(matches!(result, Err(RuntimeError::Driver(_))));
}

#[tokio::test]
async fn connected_app_pings_and_refreshes_status() {
    let (addr, stop, handle) = start_server(local_config()).await;
    let mounted = mount_connected(addr).await;

    let server = mounted.app.server().cloned().unwrap();
    assert_eq!(server.version, "test");
    assert!(mounted.capabilities.contains::<Session>());

    let mounted =
        Runtime::new(Scripted::line("/ping"), mounted, IDLE_REFRESH).run().await.unwrap();

    assert!(mounted.app.latency().is_some());
    assert_eq!(mounted.app.status().map(|s| s.sessions), Some(1));
    assert!(!mounted.capabilities.contains::<Session>());

    stop.send(()).unwrap();
    handle.await.unwrap();
}
