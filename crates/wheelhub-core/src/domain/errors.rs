//! Domain error types
//!
//! Errors raised by interactive sign-in and token issuance. Transport and
//! gating errors live with the crates that produce them.

use thiserror::Error;

/// Errors that can occur while authenticating the current session
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The user dismissed the sign-in flow
    #[error("Sign-in was cancelled")]
    Cancelled,

    /// The browser refused to open the sign-in popup
    #[error("Sign-in popup was blocked")]
    PopupBlocked,

    /// The identity provider rejected the credentials
    #[error("Provider {provider} rejected the sign-in: {reason}")]
    ProviderRejected {
        /// Provider that refused the request
        provider: String,
        /// Message reported by the provider
        reason: String,
    },

    /// A bearer token could not be issued for the principal
    #[error("Could not issue a token: {0}")]
    TokenUnavailable(String),
}
