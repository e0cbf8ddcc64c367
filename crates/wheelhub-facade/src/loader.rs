//! Lazy client loader
//!
//! Builds the [`BackendHandle`] on first use. Concurrent callers share one
//! in-flight initialization; once a handle exists it is never replaced.
//! A failed initialization is returned to the caller that ran it and is not
//! cached: the next caller, including one already waiting, starts over.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};
use wheelhub_core::config::BackendConfig;
use wheelhub_core::domain::BestEffort;
use wheelhub_core::ports::IBackendFactory;
use wheelhub_store::RecordStore;

use crate::identity::IdentityService;
use crate::FacadeError;

/// The initialized backend clients
pub struct BackendHandle {
    pub identity: IdentityService,
    pub records: RecordStore,
    /// Outcome of enabling offline persistence
    pub persistence: BestEffort,
}

/// Single-assignment holder for the [`BackendHandle`]
pub struct ClientLoader {
    settings: BackendConfig,
    factory: Arc<dyn IBackendFactory>,
    handle: OnceCell<Arc<BackendHandle>>,
}

impl ClientLoader {
    pub fn new(settings: BackendConfig, factory: Arc<dyn IBackendFactory>) -> Self {
        Self {
            settings,
            factory,
            handle: OnceCell::new(),
        }
    }

    /// Returns the handle, initializing the backend if needed
    pub async fn ensure_loaded(&self) -> Result<Arc<BackendHandle>, FacadeError> {
        self.handle
            .get_or_try_init(|| self.initialize())
            .await
            .map(Arc::clone)
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.initialized()
    }

    /// The handle, if initialization has completed
    pub fn handle(&self) -> Option<Arc<BackendHandle>> {
        self.handle.get().cloned()
    }

    async fn initialize(&self) -> Result<Arc<BackendHandle>, FacadeError> {
        info!(
            project = self.settings.project_id.as_deref().unwrap_or_default(),
            "Initializing cloud backend"
        );

        let identity = self
            .factory
            .load_identity(&self.settings)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to load identity provider");
                FacadeError::Initialization(e)
            })?;
        let store = self
            .factory
            .load_store(&self.settings)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to load document store");
                FacadeError::Initialization(e)
            })?;

        let persistence = if self.settings.offline_persistence {
            store.enable_persistence().await
        } else {
            BestEffort::skipped("offline persistence disabled")
        };

        info!(persistence = %persistence, "Cloud backend ready");
        Ok(Arc::new(BackendHandle {
            identity: IdentityService::new(identity),
            records: RecordStore::new(store),
            persistence,
        }))
    }
}
