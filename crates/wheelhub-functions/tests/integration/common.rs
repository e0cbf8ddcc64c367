//! Shared test helpers for function gateway integration tests

use std::sync::Arc;

use wheelhub_functions::client::FunctionsClient;
use wheelhub_telemetry::ReportingTracker;
use wiremock::MockServer;

/// Token attached by tests that need an authenticated caller
pub const TEST_TOKEN: &str = "test-id-token";

/// Starts a mock server and returns a client pointing at it together with
/// the in-memory tracker receiving swallowed failures
pub async fn setup_functions_mock() -> (MockServer, FunctionsClient, Arc<ReportingTracker>) {
    let server = MockServer::start().await;
    let tracker = Arc::new(ReportingTracker::in_memory());
    let client = FunctionsClient::new(server.uri(), tracker.clone());
    (server, client, tracker)
}
