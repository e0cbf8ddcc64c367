//! Non-fatal error report generation
//!
//! Captures failures the access layer absorbed into a safe default.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A structured error report (non-fatal)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub id: String,
    pub timestamp: String,
    pub version: String,
    pub context: String,
    pub message: String,
    pub chain: Vec<String>,
}

impl ErrorReport {
    /// Create a new error report.
    pub fn new(context: &str, message: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            context: context.to_string(),
            message: message.to_string(),
            chain: Vec::new(),
        }
    }

    /// Build a report from an error and its `source()` chain.
    pub fn from_error(context: &str, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        Self::new(context, &error.to_string()).with_chain(chain)
    }

    /// Add an error chain entry.
    pub fn with_chain(mut self, chain: Vec<String>) -> Self {
        self.chain = chain;
        self
    }

    /// File name used by [`crate::LocalReportStore`], e.g. `error-20261019-<id>.json`.
    pub fn file_name(&self) -> String {
        let date = self
            .timestamp
            .get(..10)
            .map(|d| d.replace('-', ""))
            .unwrap_or_default();
        format!("error-{date}-{}.json", self.id)
    }
}

/// Filters which errors are worth persisting.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Determines whether an error should be written to the report store.
    ///
    /// Excludes transient/expected errors like timeouts and refused
    /// connections; those are still logged.
    pub fn should_report(error_msg: &str) -> bool {
        let lower = error_msg.to_lowercase();

        if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection refused")
            || lower.contains("too many requests")
            || lower.contains("429")
        {
            return false;
        }

        true
    }
}
