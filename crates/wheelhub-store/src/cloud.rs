//! Cloud backend factory
//!
//! Pairs the REST document store, built from the `backend` config section,
//! with an identity provider supplied by the embedding application.
//! Interactive provider sign-in needs the host's browser or UI toolkit, so
//! it is not implemented here; the same provider also issues the bearer
//! tokens the document store sends.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use wheelhub_core::config::BackendConfig;
use wheelhub_core::ports::{IBackendFactory, IDocumentStore, IIdentityProvider};

use crate::rest::RestDocumentStore;

/// Backend factory for the hosted cloud project
#[derive(Clone)]
pub struct CloudFactory {
    identity: Arc<dyn IIdentityProvider>,
}

impl CloudFactory {
    pub fn new(identity: Arc<dyn IIdentityProvider>) -> Self {
        Self { identity }
    }
}

#[async_trait::async_trait]
impl IBackendFactory for CloudFactory {
    async fn load_identity(&self, config: &BackendConfig) -> Result<Arc<dyn IIdentityProvider>> {
        info!(
            project = config.project_id.as_deref().unwrap_or_default(),
            "Loading cloud identity provider"
        );
        Ok(Arc::clone(&self.identity))
    }

    async fn load_store(&self, config: &BackendConfig) -> Result<Arc<dyn IDocumentStore>> {
        let store =
            RestDocumentStore::from_config(config)?.with_identity(Arc::clone(&self.identity));
        info!(
            url = store.base_url(),
            project = config.project_id.as_deref().unwrap_or_default(),
            "Loading cloud document store"
        );
        let store: Arc<dyn IDocumentStore> = Arc::new(store);
        Ok(store)
    }
}
