//! Account lifecycle tests

use serde_json::json;
use wheelhub_core::domain::BestEffort;
use wheelhub_functions::account;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{setup_functions_mock, TEST_TOKEN};

#[tokio::test]
async fn test_convert_account_authorizes_with_new_token() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/convertAccount"))
        .and(header("authorization", "new-token"))
        .and(body_json(json!({"oldIdToken": "old-token"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let status = account::convert_account(&client, "old-token", "new-token").await;
    assert_eq!(status, BestEffort::Succeeded);
    assert_eq!(tracker.report_count(), 0);
}

#[tokio::test]
async fn test_convert_account_failure_is_tracked() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/convertAccount"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let status = account::convert_account(&client, "old-token", "new-token").await;
    assert!(matches!(status, BestEffort::Skipped(_)));
    assert_eq!(tracker.report_count(), 1);
    assert_eq!(tracker.reports()[0].context, "convertAccount");
}

#[tokio::test]
async fn test_delete_account() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/deleteAccount"))
        .and(header("authorization", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let status = account::delete_account(&client, TEST_TOKEN).await;
    assert!(status.succeeded());
    assert_eq!(tracker.report_count(), 0);
}

#[tokio::test]
async fn test_delete_account_error_field_is_tracked() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/deleteAccount"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "not signed in"})))
        .mount(&server)
        .await;

    let status = account::delete_account(&client, TEST_TOKEN).await;
    assert!(matches!(status, BestEffort::Skipped(_)));
    assert_eq!(tracker.report_count(), 1);
}
