//! Emulator backend factory
//!
//! Hands out the same in-memory identity provider and document store on
//! every load so tests and local development can inspect them.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use wheelhub_core::config::BackendConfig;
use wheelhub_core::ports::{IBackendFactory, IDocumentStore, IIdentityProvider};

use crate::identity::MemoryIdentityProvider;
use crate::memory::MemoryDocumentStore;

/// Backend factory serving the in-process emulator
#[derive(Clone, Default)]
pub struct EmulatorFactory {
    identity: Arc<MemoryIdentityProvider>,
    store: Arc<MemoryDocumentStore>,
}

impl EmulatorFactory {
    pub fn new(identity: Arc<MemoryIdentityProvider>, store: Arc<MemoryDocumentStore>) -> Self {
        Self { identity, store }
    }

    pub fn identity(&self) -> Arc<MemoryIdentityProvider> {
        Arc::clone(&self.identity)
    }

    pub fn store(&self) -> Arc<MemoryDocumentStore> {
        Arc::clone(&self.store)
    }
}

#[async_trait::async_trait]
impl IBackendFactory for EmulatorFactory {
    async fn load_identity(&self, config: &BackendConfig) -> Result<Arc<dyn IIdentityProvider>> {
        info!(
            project = config.project_id.as_deref().unwrap_or("emulator"),
            "Loading emulator identity provider"
        );
        let identity: Arc<dyn IIdentityProvider> = self.identity.clone();
        Ok(identity)
    }

    async fn load_store(&self, _config: &BackendConfig) -> Result<Arc<dyn IDocumentStore>> {
        info!("Loading emulator document store");
        let store: Arc<dyn IDocumentStore> = self.store.clone();
        Ok(store)
    }
}
