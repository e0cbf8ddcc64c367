//! In-memory identity provider
//!
//! Emulates the cloud SDK's auth module. Accounts are registered per
//! provider up front; interactive sign-in then succeeds for registered
//! providers and is rejected for the rest.

use std::sync::{Mutex, RwLock};

use anyhow::{bail, Result};
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;
use wheelhub_core::domain::{AuthError, AuthProvider, Principal, SignInRequest, SignInUiOptions};
use wheelhub_core::ports::IIdentityProvider;

/// Prefix of the bearer tokens issued by the emulator
pub const TOKEN_PREFIX: &str = "emulator-token:";

/// Identity provider that keeps the session in memory
#[derive(Default)]
pub struct MemoryIdentityProvider {
    current: RwLock<Option<Principal>>,
    accounts: DashMap<AuthProvider, Principal>,
    sign_in_requests: Mutex<Vec<SignInRequest>>,
    ui_mounts: Mutex<Vec<(String, SignInUiOptions)>>,
    sign_out_failure: Mutex<Option<String>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the account returned by sign-ins through `provider`
    pub fn with_account(self, provider: AuthProvider, principal: Principal) -> Self {
        self.accounts.insert(provider, principal);
        self
    }

    /// Replaces the current session, as a sign-in elsewhere would
    pub fn set_current_user(&self, principal: Option<Principal>) {
        if let Ok(mut current) = self.current.write() {
            *current = principal;
        }
    }

    /// Makes the next sign-out fail with `reason`
    pub fn fail_sign_out(&self, reason: impl Into<String>) {
        if let Ok(mut failure) = self.sign_out_failure.lock() {
            *failure = Some(reason.into());
        }
    }

    /// Interactive sign-in requests received so far
    pub fn sign_in_requests(&self) -> Vec<SignInRequest> {
        self.sign_in_requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Sign-in widget mounts received so far
    pub fn ui_mounts(&self) -> Vec<(String, SignInUiOptions)> {
        self.ui_mounts
            .lock()
            .map(|mounts| mounts.clone())
            .unwrap_or_default()
    }

    /// Returns the token the emulator issues for `uid`
    pub fn token_for(uid: &str) -> String {
        format!("{TOKEN_PREFIX}{uid}")
    }

    fn current(&self) -> Option<Principal> {
        self.current.read().ok().and_then(|current| current.clone())
    }

    fn establish(&self, principal: Principal) -> Principal {
        self.set_current_user(Some(principal.clone()));
        info!(uid = %principal.uid, anonymous = principal.is_anonymous, "Session established");
        principal
    }
}

#[async_trait::async_trait]
impl IIdentityProvider for MemoryIdentityProvider {
    async fn current_user(&self) -> Option<Principal> {
        self.current()
    }

    async fn id_token(&self, principal: &Principal) -> Result<String, AuthError> {
        match self.current() {
            Some(current) if current.uid == principal.uid => Ok(Self::token_for(&principal.uid)),
            _ => Err(AuthError::TokenUnavailable(format!(
                "{} is no longer signed in",
                principal.uid
            ))),
        }
    }

    async fn sign_in(&self, request: &SignInRequest) -> Result<Principal, AuthError> {
        if let Ok(mut requests) = self.sign_in_requests.lock() {
            requests.push(request.clone());
        }
        debug!(
            provider = %request.provider,
            language = %request.language_code,
            scopes = ?request.scopes,
            "Sign-in requested"
        );

        let account = self
            .accounts
            .get(&request.provider)
            .map(|account| account.value().clone());
        match account {
            Some(principal) => Ok(self.establish(principal)),
            None => Err(AuthError::ProviderRejected {
                provider: request.provider.to_string(),
                reason: "no account registered".to_string(),
            }),
        }
    }

    async fn sign_in_anonymously(&self) -> Result<Principal, AuthError> {
        let principal = Principal::anonymous(Uuid::new_v4().to_string());
        Ok(self.establish(principal))
    }

    async fn start_sign_in_ui(
        &self,
        container_id: &str,
        options: &SignInUiOptions,
    ) -> Result<Principal, AuthError> {
        if let Ok(mut mounts) = self.ui_mounts.lock() {
            mounts.push((container_id.to_string(), options.clone()));
        }

        let account = options
            .providers
            .iter()
            .find_map(|provider| self.accounts.get(provider).map(|a| a.value().clone()));
        match account {
            Some(principal) => Ok(self.establish(principal)),
            None => Err(AuthError::Cancelled),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        let failure = self
            .sign_out_failure
            .lock()
            .ok()
            .and_then(|mut failure| failure.take());
        if let Some(reason) = failure {
            bail!("Sign-out failed: {reason}");
        }

        self.set_current_user(None);
        info!("Signed out");
        Ok(())
    }
}
