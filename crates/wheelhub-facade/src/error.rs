//! Caller-facing error taxonomy

use serde_json::Value;
use thiserror::Error;
use wheelhub_core::domain::AuthError;
use wheelhub_functions::{FunctionsError, ADMIN_REQUIRED_MESSAGE};

/// Errors returned by [`Facade`](crate::Facade) operations
#[derive(Debug, Error)]
pub enum FacadeError {
    /// The operation needs the cloud backend and basic mode is on
    #[error("{feature} requires the cloud backend and is disabled in basic mode.")]
    ModeDisabled { feature: &'static str },

    /// Interactive sign-in or token issuance failed
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The function gateway could not be reached or answered garbage
    #[error("Transport error: {0}")]
    Transport(String),

    /// The function gateway reported an application error
    #[error("{}", domain_message(.0))]
    Domain(Value),

    /// The operation needs a signed-in user and nobody is signed in
    #[error("{feature} requires a signed-in user")]
    NoCaller { feature: &'static str },

    /// A document store or identity provider call failed
    #[error("Backend error: {0:#}")]
    Backend(anyhow::Error),

    /// The backend could not be initialized
    #[error("Backend initialization failed: {0:#}")]
    Initialization(anyhow::Error),
}

impl FacadeError {
    /// Returns the feature name for gating errors
    pub fn feature(&self) -> Option<&'static str> {
        match self {
            Self::ModeDisabled { feature } | Self::NoCaller { feature } => Some(*feature),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for FacadeError {
    fn from(error: anyhow::Error) -> Self {
        Self::Backend(error)
    }
}

impl From<FunctionsError> for FacadeError {
    fn from(error: FunctionsError) -> Self {
        match error {
            FunctionsError::AdminRequired => Self::Domain(Value::from(ADMIN_REQUIRED_MESSAGE)),
            FunctionsError::Server(value) => Self::Domain(value),
            other @ (FunctionsError::Network(_)
            | FunctionsError::InvalidResponse(_)
            | FunctionsError::InvalidUrl(_)) => Self::Transport(other.to_string()),
        }
    }
}

/// Plain strings are shown as-is, anything else as JSON
fn domain_message(value: &Value) -> String {
    match value {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_mode_disabled_message() {
        let err = FacadeError::ModeDisabled {
            feature: "Saving wheels",
        };
        assert_eq!(
            err.to_string(),
            "Saving wheels requires the cloud backend and is disabled in basic mode."
        );
        assert_eq!(err.feature(), Some("Saving wheels"));
    }

    #[test]
    fn test_admin_required_maps_to_domain_message() {
        let err = FacadeError::from(FunctionsError::AdminRequired);
        assert!(matches!(err, FacadeError::Domain(_)));
        assert_eq!(err.to_string(), "Please log in as an admin user");
    }

    #[test]
    fn test_server_error_kept_verbatim() {
        let payload = json!({"code": 7, "detail": "quota"});
        match FacadeError::from(FunctionsError::Server(payload.clone())) {
            FacadeError::Domain(value) => assert_eq!(value, payload),
            other => panic!("expected Domain, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_response_is_transport() {
        let err = FacadeError::from(FunctionsError::InvalidResponse("not json".to_string()));
        assert!(matches!(err, FacadeError::Transport(_)));
    }

    #[test]
    fn test_backend_error_shows_context_chain() {
        let err = FacadeError::from(
            anyhow::anyhow!("connection reset").context("Failed to list admins"),
        );
        assert_eq!(
            err.to_string(),
            "Backend error: Failed to list admins: connection reset"
        );
    }
}
