//! Common test utilities for integration tests.
//!
//! Provides a mock-backed controller harness shared across test files.

use std::sync::Arc;

use flotilla::adapters::mock::{MockComputeProvider, MockObjectStore, MockRemoteShell};
use flotilla::application::FleetController;
use flotilla::domain::models::{Config, WatcherConfig};
use flotilla::domain::ports::ObjectStore;

/// A fleet controller wired against in-memory mocks, with fast watcher
/// timing so tests stay bounded.
pub struct Harness {
    pub provider: Arc<MockComputeProvider>,
    pub store: Arc<MockObjectStore>,
    pub shell: Arc<MockRemoteShell>,
    pub controller: FleetController,
}

pub fn harness() -> Harness {
    let config = Config {
        watcher: WatcherConfig { poll_interval_ms: 20, ..WatcherConfig::default() },
        ..Config::default()
    };

    let provider = Arc::new(MockComputeProvider::new());
    let store = Arc::new(MockObjectStore::new());
    let shell = Arc::new(MockRemoteShell::new());
    let controller = FleetController::new(
        provider.clone(),
        store.clone(),
        shell.clone(),
        config,
    );
    Harness { provider, store, shell, controller }
}

/// Script a completed log tail and stage the matching payload.
pub async fn complete_container(
    harness: &Harness,
    group: &str,
    container: &str,
    token: &str,
    payload: &str,
) {
    harness
        .provider
        .set_logs(group, container, &format!("Starting\nRunning\ncommand: {token}\n"))
        .await;
    harness
        .store
        .put(payload.as_bytes().to_vec(), Some(token))
        .await
        .expect("stage payload");
}

/// Setup test logging; call at the start of tests that need output.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
