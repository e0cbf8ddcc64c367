//! Exception tracker
//!
//! [`ReportingTracker`] is the production [`IExceptionTracker`]: every tracked
//! failure is logged and kept in a bounded in-memory buffer; reportable ones
//! are also written to the local report store when one is configured. A
//! tracker built on a store starts with the reports saved by earlier runs.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, warn};
use wheelhub_core::config::TelemetryConfig;
use wheelhub_core::ports::IExceptionTracker;

use crate::error_report::{ErrorReport, ErrorReporter};
use crate::store::LocalReportStore;

/// Number of recent reports kept in memory
const RECENT_CAPACITY: usize = 100;

/// Logs, buffers and optionally persists swallowed failures
pub struct ReportingTracker {
    store: Option<LocalReportStore>,
    recent: Mutex<VecDeque<ErrorReport>>,
}

impl ReportingTracker {
    /// Tracker that only logs and buffers
    pub fn in_memory() -> Self {
        Self {
            store: None,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    /// Tracker that also writes reports to `store`, seeded with the newest
    /// reports already saved there
    pub fn with_store(store: LocalReportStore) -> Self {
        let saved = store.load().unwrap_or_else(|e| {
            warn!(
                dir = %store.reports_dir().display(),
                error = %e,
                "Failed to load saved reports"
            );
            Vec::new()
        });
        let skip = saved.len().saturating_sub(RECENT_CAPACITY);
        let recent: VecDeque<_> = saved.into_iter().skip(skip).collect();
        debug!(replayed = recent.len(), "Loaded saved reports");

        Self {
            store: Some(store),
            recent: Mutex::new(recent),
        }
    }

    /// Builds a tracker from the `telemetry` config section
    pub fn from_config(config: &TelemetryConfig) -> Self {
        if config.enabled {
            Self::with_store(LocalReportStore::new(config.reports_dir.clone()))
        } else {
            Self::in_memory()
        }
    }

    /// Snapshot of buffered reports, oldest first
    pub fn reports(&self) -> Vec<ErrorReport> {
        self.recent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Number of buffered reports
    pub fn report_count(&self) -> usize {
        self.recent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn remember(&self, report: ErrorReport) {
        let mut recent = self.recent.lock().unwrap_or_else(PoisonError::into_inner);
        if recent.len() == RECENT_CAPACITY {
            recent.pop_front();
        }
        recent.push_back(report);
    }
}

impl IExceptionTracker for ReportingTracker {
    fn track_exception(&self, context: &str, error: &(dyn std::error::Error + 'static)) {
        let report = ErrorReport::from_error(context, error);
        warn!(context, error = %report.message, report_id = %report.id, "Tracked exception");

        if let Some(store) = &self.store {
            if ErrorReporter::should_report(&report.message) {
                match store.save(&report) {
                    Ok(path) => debug!(path = %path.display(), "Saved error report"),
                    Err(e) => warn!(error = %e, "Failed to save error report"),
                }
            }
        }

        self.remember(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_error(msg: &str) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, msg.to_string())
    }

    #[test]
    fn test_in_memory_tracker_buffers_reports() {
        let tracker = ReportingTracker::in_memory();
        tracker.track_exception("getCarousels", &io_error("bad body"));
        tracker.track_exception("getSpinStats", &io_error("timed out"));

        let reports = tracker.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].context, "getCarousels");
        assert_eq!(reports[1].message, "timed out");
    }

    #[test]
    fn test_buffer_is_bounded() {
        let tracker = ReportingTracker::in_memory();
        for i in 0..(RECENT_CAPACITY + 5) {
            tracker.track_exception(&format!("call-{i}"), &io_error("boom"));
        }
        assert_eq!(tracker.report_count(), RECENT_CAPACITY);
        assert_eq!(tracker.reports()[0].context, "call-5");
    }

    #[test]
    fn test_store_skips_transient_errors() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = ReportingTracker::with_store(LocalReportStore::new(dir.path().to_path_buf()));

        tracker.track_exception("getCarousels", &io_error("connection refused"));
        tracker.track_exception("getCarousels", &io_error("expected value at line 1"));

        let store = LocalReportStore::new(dir.path().to_path_buf());
        assert_eq!(store.load().unwrap().len(), 1);
        assert_eq!(tracker.report_count(), 2);
    }

    #[test]
    fn test_saved_reports_are_replayed() {
        let dir = tempfile::tempdir().unwrap();
        let first = ReportingTracker::with_store(LocalReportStore::new(dir.path().to_path_buf()));
        first.track_exception("getSpinStats", &io_error("expected value at line 1"));
        first.track_exception("getCarousels", &io_error("connection refused"));

        let next = ReportingTracker::with_store(LocalReportStore::new(dir.path().to_path_buf()));
        let reports = next.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].context, "getSpinStats");
    }

    #[test]
    fn test_from_config_disabled_has_no_store() {
        let tracker = ReportingTracker::from_config(&TelemetryConfig::default());
        assert!(tracker.store.is_none());
    }
}
