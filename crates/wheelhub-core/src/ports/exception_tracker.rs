//! Exception tracker port
//!
//! Failures that are absorbed into a safe default are still reported here
//! so they are not lost.

/// Port trait for an external exception tracking collaborator
pub trait IExceptionTracker: Send + Sync {
    /// Records a swallowed failure that happened during `context`
    fn track_exception(&self, context: &str, error: &(dyn std::error::Error + 'static));
}

/// Tracker that discards every report
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracker;

impl IExceptionTracker for NoopTracker {
    fn track_exception(&self, _context: &str, _error: &(dyn std::error::Error + 'static)) {}
}
