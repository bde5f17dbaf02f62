//! In-memory host, root and driver shared by the integration tests.

#![allow(dead_code)]

use std::{
    collections::VecDeque,
    convert::Infallible,
    future::{Future, ready},
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use lodestar_app::{Anchor, App, Driver, Host, KeyInput, RenderRoot};
use lodestar_server::{Server, ServerConfig};
use tokio::{sync::oneshot, task::JoinHandle};

#[derive(Debug, thiserror::Error)]
#[error("anchor `{0}` already has a root")]
pub struct RootExists(pub String);

/// Host document with a fixed set of anchors.
#[derive(Debug, Default)]
pub struct FakeHost {
    anchors: Vec<String>,
    mounted: Vec<String>,
    pub roots_created: Arc<AtomicUsize>,
}

impl FakeHost {
    pub fn with_anchors(ids: &[&str]) -> Self {
        Self { anchors: ids.iter().map(ToString::to_string).collect(), ..Self::default() }
    }

    pub fn roots(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.roots_created)
    }
}

impl Host for FakeHost {
    type Root = FakeRoot;
    type Error = RootExists;

    fn find_anchor(&self, id: &str) -> Option<Anchor> {
        self.anchors.iter().any(|a| a == id).then(|| Anchor::new(id))
    }

    fn create_root(&mut self, anchor: Anchor) -> Result<FakeRoot, RootExists> {
        if self.mounted.iter().any(|m| m == anchor.id()) {
            return Err(RootExists(anchor.id().to_string()));
        }
        self.mounted.push(anchor.id().to_string());
        self.roots_created.fetch_add(1, Ordering::SeqCst);
        Ok(FakeRoot { anchor, renders: 0, last_entries: Vec::new() })
    }
}

/// Root that records what it was asked to draw.
#[derive(Debug)]
pub struct FakeRoot {
    anchor: Anchor,
    pub renders: usize,
    pub last_entries: Vec<String>,
}

impl RenderRoot for FakeRoot {
    type Error = Infallible;

    fn anchor(&self) -> &Anchor {
        &self.anchor
    }

    fn render(&mut self, app: &App) -> Result<(), Infallible> {
        self.renders += 1;
        self.last_entries = app.entries().to_vec();
        Ok(())
    }
}

/// Driver replaying a fixed key sequence, then reporting end of input.
#[derive(Debug, Default)]
pub struct Scripted {
    keys: VecDeque<KeyInput>,
}

impl Scripted {
    pub fn keys(keys: impl IntoIterator<Item = KeyInput>) -> Self {
        Self { keys: keys.into_iter().collect() }
    }

    pub fn line(text: &str) -> Self {
        Self::keys(text.chars().map(KeyInput::Char).chain([KeyInput::Enter]))
    }
}

impl Driver for Scripted {
    type Error = Infallible;

    fn next_key(&mut self) -> impl Future<Output = Result<Option<KeyInput>, Infallible>> {
        ready(Ok(self.keys.pop_front()))
    }
}

pub async fn start_server(
    config: ServerConfig,
) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
    let server = Server::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        server
            .serve(async {
                let _ = stop_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, stop_tx, handle)
}

pub fn local_config() -> ServerConfig {
    ServerConfig { bind_addr: "127.0.0.1:0".parse().unwrap(), version: "test".into() }
}
