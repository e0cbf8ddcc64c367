//! WheelHub Telemetry - Exception tracking
//!
//! Provides:
//! - `ErrorReport`: Structured report of a swallowed failure
//! - `ErrorReporter`: Filter for failures worth persisting
//! - `LocalReportStore`: Bounded on-disk report log, replayed at startup
//! - `ReportingTracker`: `IExceptionTracker` implementation that logs,
//!   buffers and optionally persists reports

pub mod error_report;
pub mod store;
pub mod tracker;

pub use error_report::{ErrorReport, ErrorReporter};
pub use store::LocalReportStore;
pub use tracker::ReportingTracker;
