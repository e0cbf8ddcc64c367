//! Backend factory port
//!
//! Fetches and constructs the SDK modules the client loader initializes.
//! Each method is called at most once per successful initialization.

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::ports::{IDocumentStore, IIdentityProvider};

/// Port trait for constructing the cloud SDK's modules
#[async_trait::async_trait]
pub trait IBackendFactory: Send + Sync {
    /// Loads the core client plus its auth module, configured with `config`
    async fn load_identity(
        &self,
        config: &BackendConfig,
    ) -> anyhow::Result<Arc<dyn IIdentityProvider>>;

    /// Loads the persistent-connection database module
    async fn load_store(&self, config: &BackendConfig) -> anyhow::Result<Arc<dyn IDocumentStore>>;
}
