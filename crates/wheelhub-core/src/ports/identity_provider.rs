//! Identity provider port (driven/secondary port)
//!
//! Wraps the auth module of the cloud SDK. The current principal is live
//! state that can change at any time (sign-in in another tab, token
//! revocation), so callers must ask again instead of caching it.

use crate::domain::{AuthError, Principal, SignInRequest, SignInUiOptions};

/// Port trait for the cloud SDK's authentication module
#[async_trait::async_trait]
pub trait IIdentityProvider: Send + Sync {
    /// Returns the currently signed-in principal, if any
    async fn current_user(&self) -> Option<Principal>;

    /// Issues a fresh bearer token for `principal`
    async fn id_token(&self, principal: &Principal) -> Result<String, AuthError>;

    /// Runs an interactive provider sign-in
    async fn sign_in(&self, request: &SignInRequest) -> Result<Principal, AuthError>;

    /// Starts an anonymous guest session
    async fn sign_in_anonymously(&self) -> Result<Principal, AuthError>;

    /// Mounts the provider's sign-in widget into the container named
    /// `container_id` and resolves once the user has authenticated
    async fn start_sign_in_ui(
        &self,
        container_id: &str,
        options: &SignInUiOptions,
    ) -> Result<Principal, AuthError>;

    /// Ends the current session
    async fn sign_out(&self) -> anyhow::Result<()>;
}
