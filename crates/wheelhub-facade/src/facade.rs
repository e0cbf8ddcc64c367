//! Facade
//!
//! Every public operation is expressed as a [`Gate`] plus the work it does
//! against the [`BackendHandle`], and goes through [`Facade::gated`].

use std::future::Future;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};
use wheelhub_core::config::Config;
use wheelhub_core::domain::{
    Admin, BackendMode, BestEffort, Carousel, Principal, ResolvedCaller, SavedWheel, SharedWheel,
    WheelConfig,
};
use wheelhub_core::ports::{IBackendFactory, IDocumentStore, IExceptionTracker};
use wheelhub_functions::client::FunctionsClient;
use wheelhub_functions::{account, admin, public, shared};
use wheelhub_telemetry::ReportingTracker;

use crate::gate::Gate;
use crate::loader::{BackendHandle, ClientLoader};
use crate::FacadeError;

const SAVING_WHEELS: &str = "Saving wheels";
const CONTENT_MODERATION: &str = "Content moderation";
const ADMIN_MANAGEMENT: &str = "Admin management";
const CAROUSELS: &str = "Carousels";
const WHEEL_REVIEW: &str = "Wheel review";
const SIGN_IN: &str = "Sign-in";
const SHARING_WHEELS: &str = "Sharing wheels";
const SHARED_WHEELS: &str = "Shared wheels";
const TWITTER_IMPORT: &str = "Twitter import";
const ACCOUNT_CONVERSION: &str = "Account conversion";
const ACCOUNT_DELETION: &str = "Account deletion";
const WHEEL_REVIEW_QUEUE: &str = "Wheel review queue";
const TRANSLATE: &str = "Translate";

/// Backend access for the application
///
/// Construct once from configuration; the mode is fixed for the lifetime
/// of the value. Cheap to share behind an `Arc`.
pub struct Facade {
    mode: BackendMode,
    loader: ClientLoader,
    functions: FunctionsClient,
}

impl Facade {
    /// Creates a facade reporting swallowed failures to `tracker`
    pub fn new(
        config: &Config,
        factory: Arc<dyn IBackendFactory>,
        tracker: Arc<dyn IExceptionTracker>,
    ) -> Result<Self, FacadeError> {
        let mode = config.mode();
        let functions = FunctionsClient::from_config(&config.functions, tracker)?;
        info!(%mode, functions = functions.base_url(), "Backend facade configured");

        Ok(Self {
            mode,
            loader: ClientLoader::new(config.backend.clone(), factory),
            functions,
        })
    }

    /// Creates a facade whose tracker follows the `telemetry` config section
    pub fn from_config(
        config: &Config,
        factory: Arc<dyn IBackendFactory>,
    ) -> Result<Self, FacadeError> {
        let tracker = Arc::new(ReportingTracker::from_config(&config.telemetry));
        Self::new(config, factory, tracker)
    }

    pub fn mode(&self) -> BackendMode {
        self.mode
    }

    pub fn loader(&self) -> &ClientLoader {
        &self.loader
    }

    /// Runs `op` against the backend, or resolves `gate` in basic mode
    pub async fn gated<T, F, Fut>(&self, gate: Gate<T>, op: F) -> Result<T, FacadeError>
    where
        F: FnOnce(Arc<BackendHandle>) -> Fut,
        Fut: Future<Output = Result<T, FacadeError>>,
    {
        if self.mode.is_basic() {
            return gate.in_basic_mode();
        }
        let handle = self.loader.ensure_loaded().await?;
        op(handle).await
    }

    /// Initializes the backend ahead of the first operation; no-op in basic mode
    pub async fn load_libraries(&self) -> Result<(), FacadeError> {
        self.gated(Gate::Degrade(()), |_| async { Ok(()) }).await
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub async fn user_is_logged_in(&self) -> Result<bool, FacadeError> {
        self.gated(Gate::Degrade(false), |h| async move {
            Ok(h.identity.is_logged_in().await)
        })
        .await
    }

    pub async fn get_logged_in_user(&self) -> Result<Option<Principal>, FacadeError> {
        self.gated(Gate::Degrade(None), |h| async move {
            Ok(h.identity.current_user().await)
        })
        .await
    }

    pub async fn get_user_id_token(&self) -> Result<Option<String>, FacadeError> {
        self.gated(Gate::Degrade(None), |h| async move {
            Ok(h.identity.id_token().await?)
        })
        .await
    }

    pub async fn get_uid(&self) -> Result<Option<String>, FacadeError> {
        self.gated(Gate::Degrade(None), |h| async move {
            Ok(h.identity.resolve_caller().await.uid().map(str::to_string))
        })
        .await
    }

    /// Token of the current session, only if it is anonymous
    pub async fn get_anonymous_token_id(&self) -> Result<Option<String>, FacadeError> {
        self.gated(Gate::Degrade(None), |h| async move {
            Ok(h.identity.anonymous_token().await?)
        })
        .await
    }

    /// Mounts the sign-in widget and resolves with the signed-in user
    pub async fn load_auth_user_interface(
        &self,
        container_id: &str,
    ) -> Result<Principal, FacadeError> {
        self.gated(Gate::Require(SIGN_IN), |h| async move {
            Ok(h.identity.start_sign_in_ui(container_id).await?)
        })
        .await
    }

    /// Signs in through the named provider; unknown names use Google
    pub async fn log_in(
        &self,
        provider_name: &str,
        locale: &str,
    ) -> Result<Principal, FacadeError> {
        self.gated(Gate::Require(SIGN_IN), |h| async move {
            Ok(h.identity.sign_in(provider_name, locale).await?)
        })
        .await
    }

    pub async fn log_in_anonymously(&self) -> Result<Principal, FacadeError> {
        self.gated(Gate::Require(SIGN_IN), |h| async move {
            Ok(h.identity.sign_in_anonymously().await?)
        })
        .await
    }

    pub async fn log_in_to_sheets(&self, locale: &str) -> Result<Principal, FacadeError> {
        self.gated(Gate::Require(SIGN_IN), |h| async move {
            Ok(h.identity.sign_in_to_sheets(locale).await?)
        })
        .await
    }

    pub async fn log_out(&self) -> Result<BestEffort, FacadeError> {
        self.gated(Gate::Degrade(basic_mode_skip()), |h| async move {
            Ok(h.identity.sign_out(self.functions.tracker()).await)
        })
        .await
    }

    // ========================================================================
    // Saved wheels
    // ========================================================================

    /// Stamps the caller's last activity
    pub async fn log_user_activity(&self) -> Result<BestEffort, FacadeError> {
        self.gated(Gate::Degrade(basic_mode_skip()), |h| async move {
            match h.identity.resolve_caller().await.uid() {
                Some(uid) => {
                    h.records.log_activity(uid).await?;
                    Ok(BestEffort::Succeeded)
                }
                None => Ok(no_caller_skip()),
            }
        })
        .await
    }

    /// The caller's saved wheels; empty when nobody is signed in
    pub async fn get_wheels(&self) -> Result<Vec<SavedWheel>, FacadeError> {
        self.gated(Gate::Degrade(Vec::new()), |h| async move {
            match h.identity.resolve_caller().await.uid() {
                Some(uid) => Ok(h.records.list_saved(uid).await?),
                None => Ok(Vec::new()),
            }
        })
        .await
    }

    /// Saves a wheel under its title, overwriting a wheel with the same title
    pub async fn save_wheel(&self, config: &WheelConfig) -> Result<(), FacadeError> {
        self.gated(Gate::Require(SAVING_WHEELS), |h| async move {
            let caller = h.identity.resolve_caller().await;
            let uid = require_caller(&caller, SAVING_WHEELS)?;
            Ok(h.records.save(uid, config).await?)
        })
        .await
    }

    pub async fn delete_saved_wheel(&self, title: &str) -> Result<(), FacadeError> {
        self.gated(Gate::Require(SAVING_WHEELS), |h| async move {
            let caller = h.identity.resolve_caller().await;
            let uid = require_caller(&caller, SAVING_WHEELS)?;
            Ok(h.records.delete_saved(uid, title).await?)
        })
        .await
    }

    pub async fn log_wheel_read(&self, title: &str) -> Result<BestEffort, FacadeError> {
        self.gated(Gate::Degrade(basic_mode_skip()), |h| async move {
            match h.identity.resolve_caller().await.uid() {
                Some(uid) => Ok(h.records.log_wheel_read(uid, title).await?),
                None => Ok(no_caller_skip()),
            }
        })
        .await
    }

    // ========================================================================
    // Moderation and admins
    // ========================================================================

    pub async fn get_dirty_words(&self) -> Result<Vec<String>, FacadeError> {
        self.gated(Gate::Degrade(Vec::new()), |h| async move {
            Ok(h.records.dirty_words().await?)
        })
        .await
    }

    pub async fn set_dirty_words(&self, words: &[String]) -> Result<(), FacadeError> {
        self.gated(Gate::Require(CONTENT_MODERATION), |h| async move {
            Ok(h.records.set_dirty_words(words).await?)
        })
        .await
    }

    pub async fn get_admins(&self) -> Result<Vec<Admin>, FacadeError> {
        self.gated(Gate::Degrade(Vec::new()), |h| async move {
            Ok(h.records.admins().await?)
        })
        .await
    }

    pub async fn add_admin(&self, uid: &str, name: &str) -> Result<(), FacadeError> {
        self.gated(Gate::Require(ADMIN_MANAGEMENT), |h| async move {
            Ok(h.records.add_admin(uid, name).await?)
        })
        .await
    }

    pub async fn delete_admin(&self, uid: &str) -> Result<(), FacadeError> {
        self.gated(Gate::Require(ADMIN_MANAGEMENT), |h| async move {
            Ok(h.records.delete_admin(uid).await?)
        })
        .await
    }

    pub async fn get_earnings_per_review(&self) -> Result<f64, FacadeError> {
        self.gated(Gate::Degrade(0.0), |h| async move {
            Ok(h.records.earnings_per_review().await?)
        })
        .await
    }

    pub async fn save_carousel(&self, carousel: &Carousel) -> Result<(), FacadeError> {
        self.gated(Gate::Require(CAROUSELS), |h| async move {
            Ok(h.records.save_carousel(carousel).await?)
        })
        .await
    }

    /// Direct access to the document store
    pub async fn document_store(&self) -> Result<Option<Arc<dyn IDocumentStore>>, FacadeError> {
        self.gated(Gate::Degrade(None), |h| async move {
            Ok(Some(h.records.document_store()))
        })
        .await
    }

    // ========================================================================
    // Shared wheel review
    // ========================================================================

    /// Approves a shared wheel and credits the calling reviewer
    pub async fn approve_shared_wheel(&self, path: &str) -> Result<(), FacadeError> {
        self.gated(Gate::Require(WHEEL_REVIEW), |h| async move {
            let caller = h.identity.resolve_caller().await;
            let reviewer = require_caller(&caller, WHEEL_REVIEW)?;
            Ok(h.records.approve_shared(path, reviewer).await?)
        })
        .await
    }

    /// Rejects a shared wheel; `count_as_review` credits the reviewer
    pub async fn delete_shared_wheel(
        &self,
        path: &str,
        count_as_review: bool,
    ) -> Result<(), FacadeError> {
        self.gated(Gate::Require(WHEEL_REVIEW), |h| async move {
            let caller = h.identity.resolve_caller().await;
            let reviewer = require_caller(&caller, WHEEL_REVIEW)?;
            Ok(h.records.delete_shared(path, count_as_review, reviewer).await?)
        })
        .await
    }

    pub async fn reset_session_reviews(&self, uid: &str) -> Result<(), FacadeError> {
        self.gated(Gate::Require(WHEEL_REVIEW), |h| async move {
            Ok(h.records.reset_session_reviews(uid).await?)
        })
        .await
    }

    pub async fn set_admins_wheels_to_zero(&self, uid: &str) -> Result<(), FacadeError> {
        self.gated(Gate::Require(WHEEL_REVIEW), |h| async move {
            Ok(h.records.set_admins_wheels_to_zero(uid).await?)
        })
        .await
    }

    pub async fn get_shared_wheel(&self, path: &str) -> Result<Option<SharedWheel>, FacadeError> {
        self.gated(Gate::Degrade(None), |h| async move {
            Ok(h.records.shared_wheel(path).await?)
        })
        .await
    }

    pub async fn get_next_shared_wheel_for_review(
        &self,
    ) -> Result<Option<SharedWheel>, FacadeError> {
        self.gated(Gate::Degrade(None), |h| async move {
            Ok(h.records.next_for_review().await?)
        })
        .await
    }

    // ========================================================================
    // Function gateway
    // ========================================================================

    /// Publishes a wheel; signed-in callers are recorded as its owner
    pub async fn create_shared_wheel(
        &self,
        copyable: bool,
        config: &WheelConfig,
    ) -> Result<String, FacadeError> {
        self.gated(Gate::Require(SHARING_WHEELS), |h| async move {
            let token = h.identity.id_token().await?;
            let path =
                shared::create_shared_wheel(&self.functions, copyable, config, token.as_deref())
                    .await?;
            Ok(path)
        })
        .await
    }

    pub async fn log_shared_wheel_read(&self, path: &str) -> Result<BestEffort, FacadeError> {
        self.gated(Gate::Degrade(basic_mode_skip()), |_| async move {
            Ok(shared::log_shared_wheel_read(&self.functions, path).await)
        })
        .await
    }

    pub async fn fetch_shared_wheel(&self, path: &str) -> Result<WheelConfig, FacadeError> {
        self.gated(Gate::Require(SHARED_WHEELS), |_| async move {
            Ok(shared::get_shared_wheel(&self.functions, path).await?)
        })
        .await
    }

    /// Shared wheels created by the caller
    pub async fn get_shared_wheels(&self) -> Result<Vec<Value>, FacadeError> {
        self.gated(Gate::Require(SHARED_WHEELS), |h| async move {
            let token = require_token(&h, SHARED_WHEELS).await?;
            Ok(shared::get_shared_wheels(&self.functions, &token).await?)
        })
        .await
    }

    /// Deletes one of the caller's shared wheels; returns the remaining ones
    pub async fn delete_own_shared_wheel(&self, path: &str) -> Result<Vec<Value>, FacadeError> {
        self.gated(Gate::Require(SHARED_WHEELS), |h| async move {
            let token = require_token(&h, SHARED_WHEELS).await?;
            Ok(shared::delete_shared_wheel(&self.functions, &token, path).await?)
        })
        .await
    }

    pub async fn fetch_social_media_users(&self, term: &str) -> Result<Vec<Value>, FacadeError> {
        self.gated(Gate::Require(TWITTER_IMPORT), |_| async move {
            Ok(public::fetch_social_media_users(&self.functions, term).await?)
        })
        .await
    }

    /// Merges the anonymous account behind `old_token` into the caller's
    pub async fn convert_account(&self, old_token: &str) -> Result<BestEffort, FacadeError> {
        self.gated(Gate::Require(ACCOUNT_CONVERSION), |h| async move {
            let new_token = require_token(&h, ACCOUNT_CONVERSION).await?;
            Ok(account::convert_account(&self.functions, old_token, &new_token).await)
        })
        .await
    }

    pub async fn delete_account(&self) -> Result<BestEffort, FacadeError> {
        self.gated(Gate::Require(ACCOUNT_DELETION), |h| async move {
            let token = require_token(&h, ACCOUNT_DELETION).await?;
            Ok(account::delete_account(&self.functions, &token).await)
        })
        .await
    }

    pub async fn get_carousels(&self) -> Result<Vec<Carousel>, FacadeError> {
        self.gated(Gate::Degrade(Vec::new()), |_| async move {
            Ok(public::get_carousels(&self.functions).await)
        })
        .await
    }

    pub async fn get_number_of_wheels_in_review_queue(&self) -> Result<u64, FacadeError> {
        self.gated(Gate::Require(WHEEL_REVIEW_QUEUE), |h| async move {
            let token = require_token(&h, WHEEL_REVIEW_QUEUE).await?;
            Ok(admin::get_number_of_wheels_in_review_queue(&self.functions, &token).await?)
        })
        .await
    }

    pub async fn translate(&self, entries: &[String]) -> Result<Value, FacadeError> {
        self.gated(Gate::Require(TRANSLATE), |h| async move {
            let token = require_token(&h, TRANSLATE).await?;
            Ok(admin::translate(&self.functions, &token, entries).await?)
        })
        .await
    }

    /// Whether the caller is an admin; `false` when nobody is signed in
    pub async fn user_is_admin(&self) -> Result<bool, FacadeError> {
        self.gated(Gate::Degrade(false), |h| async move {
            match h.identity.id_token().await? {
                Some(token) => Ok(admin::user_is_admin(&self.functions, &token).await?),
                None => Ok(false),
            }
        })
        .await
    }

    pub async fn get_spin_stats(&self) -> Result<Map<String, Value>, FacadeError> {
        self.gated(Gate::Degrade(Map::new()), |_| async move {
            Ok(public::get_spin_stats(&self.functions).await)
        })
        .await
    }
}

fn basic_mode_skip() -> BestEffort {
    BestEffort::skipped("basic mode")
}

fn no_caller_skip() -> BestEffort {
    BestEffort::skipped("nobody is signed in")
}

fn require_caller<'a>(
    caller: &'a ResolvedCaller,
    feature: &'static str,
) -> Result<&'a str, FacadeError> {
    caller.uid().ok_or_else(|| {
        debug!(feature, "No signed-in caller");
        FacadeError::NoCaller { feature }
    })
}

async fn require_token(
    handle: &BackendHandle,
    feature: &'static str,
) -> Result<String, FacadeError> {
    handle.identity.id_token().await?.ok_or_else(|| {
        debug!(feature, "No signed-in caller");
        FacadeError::NoCaller { feature }
    })
}
