//! Backend mode
//!
//! The mode is decided once, before anything else runs, and never changes
//! for the lifetime of the process.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Whether the cloud backend is reachable at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// The managed cloud database/auth service is used
    #[default]
    Cloud,
    /// Every cloud feature is disabled; reads degrade to neutral defaults
    Basic,
}

impl BackendMode {
    /// Maps the `basic_mode` configuration switch to a mode
    #[must_use]
    pub const fn from_basic_flag(basic_mode: bool) -> Self {
        if basic_mode {
            Self::Basic
        } else {
            Self::Cloud
        }
    }

    /// Returns true when cloud features are disabled
    #[must_use]
    pub const fn is_basic(&self) -> bool {
        matches!(self, Self::Basic)
    }
}

impl Display for BackendMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloud => write!(f, "cloud"),
            Self::Basic => write!(f, "basic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_basic_flag() {
        assert_eq!(BackendMode::from_basic_flag(true), BackendMode::Basic);
        assert_eq!(BackendMode::from_basic_flag(false), BackendMode::Cloud);
        assert!(BackendMode::Basic.is_basic());
        assert!(!BackendMode::Cloud.is_basic());
    }

    #[test]
    fn test_default_is_cloud() {
        assert_eq!(BackendMode::default(), BackendMode::Cloud);
        assert_eq!(BackendMode::default().to_string(), "cloud");
    }
}
