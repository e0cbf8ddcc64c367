//! Shared helpers for facade integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wheelhub_core::config::{BackendConfig, Config, ConfigBuilder};
use wheelhub_core::domain::{AuthProvider, Principal};
use wheelhub_core::ports::{IBackendFactory, IDocumentStore, IIdentityProvider};
use wheelhub_facade::Facade;
use wheelhub_store::{EmulatorFactory, MemoryDocumentStore, MemoryIdentityProvider};
use wheelhub_telemetry::ReportingTracker;
use wiremock::MockServer;

/// Backend factory that counts loads and can be told to fail or stall
pub struct CountingFactory {
    inner: EmulatorFactory,
    identity_loads: AtomicUsize,
    store_loads: AtomicUsize,
    failures_left: AtomicUsize,
    delay: Duration,
}

impl CountingFactory {
    pub fn new(inner: EmulatorFactory) -> Self {
        Self {
            inner,
            identity_loads: AtomicUsize::new(0),
            store_loads: AtomicUsize::new(0),
            failures_left: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    /// Sleeps this long inside every identity load
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fails the next `count` identity loads
    pub fn failing(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn identity_loads(&self) -> usize {
        self.identity_loads.load(Ordering::SeqCst)
    }

    pub fn store_loads(&self) -> usize {
        self.store_loads.load(Ordering::SeqCst)
    }

    pub fn identity(&self) -> Arc<MemoryIdentityProvider> {
        self.inner.identity()
    }

    pub fn store(&self) -> Arc<MemoryDocumentStore> {
        self.inner.store()
    }
}

#[async_trait::async_trait]
impl IBackendFactory for CountingFactory {
    async fn load_identity(
        &self,
        config: &BackendConfig,
    ) -> anyhow::Result<Arc<dyn IIdentityProvider>> {
        self.identity_loads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if should_fail {
            anyhow::bail!("auth module failed to download");
        }
        self.inner.load_identity(config).await
    }

    async fn load_store(&self, config: &BackendConfig) -> anyhow::Result<Arc<dyn IDocumentStore>> {
        self.store_loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load_store(config).await
    }
}

pub fn ann() -> Principal {
    Principal::registered("ann-uid", Some("Ann".to_string()))
}

pub fn bob() -> Principal {
    Principal::registered("bob-uid", Some("Bob".to_string()))
}

/// Emulator with Ann behind Google and Bob behind email
pub fn emulator() -> EmulatorFactory {
    let identity = MemoryIdentityProvider::new()
        .with_account(AuthProvider::Google, ann())
        .with_account(AuthProvider::Email, bob());
    EmulatorFactory::new(Arc::new(identity), Arc::new(MemoryDocumentStore::new()))
}

pub fn cloud_config(functions_url: &str) -> Config {
    ConfigBuilder::new()
        .api_key("test-api-key")
        .project_id("wheelhub-test")
        .functions_base_url(functions_url)
        .build()
}

pub fn basic_config(functions_url: &str) -> Config {
    ConfigBuilder::new()
        .basic_mode(true)
        .functions_base_url(functions_url)
        .build()
}

/// A facade wired to a counting emulator, a mock function server and an
/// in-memory tracker
pub struct TestBackend {
    pub facade: Facade,
    pub factory: Arc<CountingFactory>,
    pub tracker: Arc<ReportingTracker>,
    pub server: MockServer,
}

impl TestBackend {
    pub async fn cloud() -> Self {
        Self::start(false, CountingFactory::new(emulator())).await
    }

    pub async fn basic() -> Self {
        Self::start(true, CountingFactory::new(emulator())).await
    }

    pub async fn with_factory(factory: CountingFactory) -> Self {
        Self::start(false, factory).await
    }

    async fn start(basic: bool, factory: CountingFactory) -> Self {
        let server = MockServer::start().await;
        let config = if basic {
            basic_config(&server.uri())
        } else {
            cloud_config(&server.uri())
        };
        let factory = Arc::new(factory);
        let tracker = Arc::new(ReportingTracker::in_memory());
        let facade = Facade::new(&config, factory.clone(), tracker.clone()).unwrap();

        Self {
            facade,
            factory,
            tracker,
            server,
        }
    }

    /// Signs Ann in directly at the provider
    pub fn sign_in_ann(&self) {
        self.factory.identity().set_current_user(Some(ann()));
    }

    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }
}
