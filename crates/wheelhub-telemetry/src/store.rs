//! On-disk report log
//!
//! One pretty-printed JSON file per report under the configured reports
//! directory. The log is bounded: after each save only the newest
//! `max_reports` files are kept.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error_report::ErrorReport;

/// Default number of report files kept on disk
pub const DEFAULT_MAX_REPORTS: usize = 200;

/// Directory of saved error reports
pub struct LocalReportStore {
    reports_dir: PathBuf,
    max_reports: usize,
}

impl LocalReportStore {
    pub fn new(reports_dir: PathBuf) -> Self {
        Self {
            reports_dir,
            max_reports: DEFAULT_MAX_REPORTS,
        }
    }

    /// Keeps at most `max_reports` files (at least one)
    pub fn with_max_reports(mut self, max_reports: usize) -> Self {
        self.max_reports = max_reports.max(1);
        self
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Writes `report`, then drops the oldest files beyond the limit
    pub fn save(&self, report: &ErrorReport) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.reports_dir)?;
        let path = self.reports_dir.join(report.file_name());
        std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
        self.prune()?;
        Ok(path)
    }

    /// Reads every saved report, oldest first
    ///
    /// Files that are not valid reports are skipped with a warning.
    pub fn load(&self) -> anyhow::Result<Vec<ErrorReport>> {
        Ok(self
            .saved()?
            .into_iter()
            .map(|(_, report)| report)
            .collect())
    }

    fn saved(&self) -> anyhow::Result<Vec<(PathBuf, ErrorReport)>> {
        if !self.reports_dir.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in std::fs::read_dir(&self.reports_dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| Ok(serde_json::from_str::<ErrorReport>(&content)?));
            match parsed {
                Ok(report) => reports.push((path, report)),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable report"),
            }
        }

        reports.sort_by(|(_, a), (_, b)| a.timestamp.cmp(&b.timestamp));
        Ok(reports)
    }

    fn prune(&self) -> anyhow::Result<()> {
        let saved = self.saved()?;
        let excess = saved.len().saturating_sub(self.max_reports);
        for (path, _) in saved.into_iter().take(excess) {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_at(context: &str, timestamp: &str) -> ErrorReport {
        ErrorReport {
            timestamp: timestamp.to_string(),
            ..ErrorReport::new(context, "invalid response")
        }
    }

    #[test]
    fn test_load_nonexistent_dir() {
        let store = LocalReportStore::new(PathBuf::from("/nonexistent/path"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalReportStore::new(dir.path().join("reports"));

        store
            .save(&report_at("getSpinStats", "2026-10-19T10:00:00+00:00"))
            .unwrap();
        let path = store
            .save(&report_at("getCarousels", "2026-10-18T10:00:00+00:00"))
            .unwrap();
        assert!(path.exists());

        let contexts: Vec<_> = store.load().unwrap().into_iter().map(|r| r.context).collect();
        assert_eq!(contexts, vec!["getCarousels", "getSpinStats"]);
    }

    #[test]
    fn test_save_prunes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalReportStore::new(dir.path().to_path_buf()).with_max_reports(2);

        for (i, day) in ["17", "18", "19"].iter().enumerate() {
            store
                .save(&report_at(&format!("call-{i}"), &format!("2026-10-{day}T00:00:00+00:00")))
                .unwrap();
        }

        let contexts: Vec<_> = store.load().unwrap().into_iter().map(|r| r.context).collect();
        assert_eq!(contexts, vec!["call-1", "call-2"]);
    }

    #[test]
    fn test_unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("error-20261019-broken.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let store = LocalReportStore::new(dir.path().to_path_buf());
        store.save(&ErrorReport::new("getCarousels", "bad body")).unwrap();
        assert_eq!(store.load().unwrap().len(), 1);
    }
}
