//! Entry point tests: mount only after readiness, exactly once.

mod common;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use common::FakeHost;
use lodestar_app::{ANCHOR_ID, App, Entry, EntryError};
use lodestar_core::{
    Capabilities, InitError, ReadinessState, RuntimeInitializer, SetupStep, StepError,
};

struct Marker;

struct InstallMarker;

#[async_trait]
impl SetupStep for InstallMarker {
    fn name(&self) -> &str {
        "install_marker"
    }

    async fn run(&self, capabilities: &mut Capabilities) -> Result<(), StepError> {
        tokio::time::sleep(Duration::from_millis(20)).await;
        capabilities.insert(Marker);
        Ok(())
    }
}

struct Broken;

#[async_trait]
impl SetupStep for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    async fn run(&self, _: &mut Capabilities) -> Result<(), StepError> {
        Err(StepError::Failed("no runtime for you".into()))
    }
}

struct Hang;

#[async_trait]
impl SetupStep for Hang {
    fn name(&self) -> &str {
        "hang"
    }

    async fn run(&self, _: &mut Capabilities) -> Result<(), StepError> {
        std::future::pending::<()>().await;
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn mounts_once_after_ready() {
    let host = FakeHost::with_anchors(&[ANCHOR_ID]);
    let roots = host.roots();
    let saw_marker = Arc::new(AtomicBool::new(false));

    let entry = Entry::new(host, RuntimeInitializer::default().step(InstallMarker));
    let gate = entry.gate();
    assert_eq!(gate.state(), ReadinessState::Uninitialized);

    let flag = Arc::clone(&saw_marker);
    let mounted = entry
        .start(move |caps| {
            flag.store(caps.contains::<Marker>(), Ordering::SeqCst);
            App::new(None)
        })
        .await
        .unwrap();

    assert!(saw_marker.load(Ordering::SeqCst));
    assert!(gate.is_ready());
    assert!(mounted.gate.is_ready());
    assert_eq!(roots.load(Ordering::SeqCst), 1);
    assert_eq!(mounted.root.renders, 1);
    assert!(mounted.capabilities.contains::<Marker>());
}

#[tokio::test]
async fn failed_initialization_leaves_host_untouched() {
    let host = FakeHost::with_anchors(&[ANCHOR_ID]);
    let roots = host.roots();
    let entry = Entry::new(host, RuntimeInitializer::default().step(Broken));
    let gate = entry.gate();

    let built = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&built);
    let result = entry
        .start(move |_| {
            flag.store(true, Ordering::SeqCst);
            App::new(None)
        })
        .await;

    assert!(matches!(
        result,
        Err(EntryError::Initialization(InitError::StepFailed { ref step, .. })) if step == "broken"
    ));
    assert!(!built.load(Ordering::SeqCst));
    assert_eq!(roots.load(Ordering::SeqCst), 0);
    assert!(matches!(gate.state(), ReadinessState::Failed { .. }));
}

#[tokio::test]
async fn missing_anchor_is_fatal() {
    let host = FakeHost::with_anchors(&["sidebar"]);
    let roots = host.roots();
    let entry = Entry::new(host, RuntimeInitializer::default());

    let result = entry.start(|_| App::new(None)).await;

    assert!(matches!(result, Err(EntryError::MissingAnchor { ref id }) if id == ANCHOR_ID));
    assert_eq!(roots.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn hung_initializer_never_mounts() {
    let host = FakeHost::with_anchors(&[ANCHOR_ID]);
    let roots = host.roots();
    let entry = Entry::new(host, RuntimeInitializer::default().step(Hang));
    let gate = entry.gate();

    let outcome =
        tokio::time::timeout(Duration::from_secs(3600), entry.start(|_| App::new(None))).await;

    assert!(outcome.is_err());
    assert_eq!(roots.load(Ordering::SeqCst), 0);
    assert_eq!(gate.state(), ReadinessState::Initializing);
}

#[tokio::test]
async fn empty_initializer_mounts_immediately() {
    let host = FakeHost::with_anchors(&[ANCHOR_ID]);
    let entry = Entry::new(host, RuntimeInitializer::default());

    let mounted = entry.start(|_| App::new(None)).await.unwrap();
    assert_eq!(mounted.root.renders, 1);
    assert!(mounted.capabilities.is_empty());
}
