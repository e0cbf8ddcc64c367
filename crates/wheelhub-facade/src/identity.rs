//! Identity service
//!
//! Wraps the identity provider port with the application's sign-in
//! conventions. Nothing here caches the principal: every call asks the
//! provider again.

use std::sync::Arc;

use tracing::{info, warn};
use wheelhub_core::domain::{
    AuthError, AuthProvider, BestEffort, Principal, ResolvedCaller, SignInRequest,
    SignInUiOptions, SHEETS_READONLY_SCOPE,
};
use wheelhub_core::ports::{IExceptionTracker, IIdentityProvider};

/// Session queries and sign-in flows over an [`IIdentityProvider`]
#[derive(Clone)]
pub struct IdentityService {
    provider: Arc<dyn IIdentityProvider>,
}

impl IdentityService {
    pub fn new(provider: Arc<dyn IIdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn is_logged_in(&self) -> bool {
        self.provider.current_user().await.is_some()
    }

    pub async fn current_user(&self) -> Option<Principal> {
        self.provider.current_user().await
    }

    /// Snapshot of who is calling right now
    pub async fn resolve_caller(&self) -> ResolvedCaller {
        ResolvedCaller::from(self.provider.current_user().await.as_ref())
    }

    /// Fresh token for the signed-in user; `None` when nobody is signed in
    pub async fn id_token(&self) -> Result<Option<String>, AuthError> {
        match self.provider.current_user().await {
            Some(principal) => self.provider.id_token(&principal).await.map(Some),
            None => Ok(None),
        }
    }

    /// Fresh token, only for anonymous sessions
    pub async fn anonymous_token(&self) -> Result<Option<String>, AuthError> {
        match self.provider.current_user().await {
            Some(principal) if principal.is_anonymous => {
                self.provider.id_token(&principal).await.map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Interactive sign-in through the named provider
    ///
    /// Unknown provider names fall back to Google. The locale is passed to
    /// the provider unchanged.
    pub async fn sign_in(&self, provider_name: &str, locale: &str) -> Result<Principal, AuthError> {
        let provider = AuthProvider::from_name_lenient(provider_name);
        let request = SignInRequest::new(provider, locale);
        self.run_sign_in(request).await
    }

    /// Google sign-in that also requests read access to spreadsheets
    pub async fn sign_in_to_sheets(&self, locale: &str) -> Result<Principal, AuthError> {
        let request =
            SignInRequest::new(AuthProvider::Google, locale).with_scope(SHEETS_READONLY_SCOPE);
        self.run_sign_in(request).await
    }

    pub async fn sign_in_anonymously(&self) -> Result<Principal, AuthError> {
        let principal = self.provider.sign_in_anonymously().await?;
        info!(uid = %principal.uid, "Signed in anonymously");
        Ok(principal)
    }

    /// Mounts the sign-in widget into `container_id`
    pub async fn start_sign_in_ui(&self, container_id: &str) -> Result<Principal, AuthError> {
        self.provider
            .start_sign_in_ui(container_id, &Self::ui_options())
            .await
    }

    /// Widget configuration: popup flow, Google account chooser, Twitter
    /// and email
    pub fn ui_options() -> SignInUiOptions {
        SignInUiOptions::default()
    }

    /// Ends the session; failures are logged and sent to `tracker`, never
    /// raised
    pub async fn sign_out(&self, tracker: &dyn IExceptionTracker) -> BestEffort {
        match self.provider.sign_out().await {
            Ok(()) => BestEffort::Succeeded,
            Err(e) => {
                warn!(error = %e, "Sign-out failed");
                let error: &(dyn std::error::Error + 'static) = e.as_ref();
                tracker.track_exception("signOut", error);
                BestEffort::skipped(format!("{e:#}"))
            }
        }
    }

    async fn run_sign_in(&self, request: SignInRequest) -> Result<Principal, AuthError> {
        let principal = self.provider.sign_in(&request).await?;
        info!(
            provider = %request.provider,
            uid = %principal.uid,
            "Signed in"
        );
        Ok(principal)
    }
}
