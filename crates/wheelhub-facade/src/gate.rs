//! Basic mode policy per operation

use tracing::debug;

use crate::FacadeError;

/// What an operation does when the cloud backend is disabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<T> {
    /// Succeed with this neutral value
    Degrade(T),
    /// Fail with [`FacadeError::ModeDisabled`] naming this feature
    Require(&'static str),
}

impl<T> Gate<T> {
    /// Resolves the gate without touching the backend
    pub fn in_basic_mode(self) -> Result<T, FacadeError> {
        match self {
            Self::Degrade(value) => Ok(value),
            Self::Require(feature) => {
                debug!(feature, "Rejected in basic mode");
                Err(FacadeError::ModeDisabled { feature })
            }
        }
    }
}
