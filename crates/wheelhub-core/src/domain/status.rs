//! Best-effort operation status
//!
//! Operations whose failure has no caller-visible recovery (enabling offline
//! persistence, signing out, telemetry calls) report what happened instead
//! of raising.

use std::fmt::{self, Display, Formatter};

/// Outcome of a best-effort operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort {
    /// The operation ran to completion
    Succeeded,
    /// The operation was not performed or its failure was absorbed
    Skipped(String),
}

impl BestEffort {
    /// Builds a `Skipped` status from any displayable reason
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped(reason.into())
    }

    /// Returns true if the operation completed
    #[must_use]
    pub fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl Display for BestEffort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}
