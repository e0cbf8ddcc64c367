//! Shared wheel endpoint tests

use serde_json::json;
use wheelhub_core::domain::{BestEffort, WheelConfig};
use wheelhub_functions::{shared, FunctionsError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{setup_functions_mock, TEST_TOKEN};

fn lunch_wheel() -> WheelConfig {
    WheelConfig::from_value(json!({"title": "Lunch", "entries": ["Tacos", "Pho"]})).unwrap()
}

#[tokio::test]
async fn test_create_shared_wheel_returns_path() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/createSharedWheel3"))
        .and(header("authorization", TEST_TOKEN))
        .and(body_json(json!({
            "copyable": true,
            "wheelConfig": {"title": "Lunch", "entries": ["Tacos", "Pho"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"path": "abc-123"})))
        .expect(1)
        .mount(&server)
        .await;

    let path = shared::create_shared_wheel(&client, true, &lunch_wheel(), Some(TEST_TOKEN))
        .await
        .unwrap();
    assert_eq!(path, "abc-123");
}

#[tokio::test]
async fn test_create_shared_wheel_surfaces_error_field_verbatim() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/createSharedWheel3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"code": "quota", "detail": "Too many wheels"}})),
        )
        .mount(&server)
        .await;

    let err = shared::create_shared_wheel(&client, false, &lunch_wheel(), None)
        .await
        .unwrap_err();
    match err {
        FunctionsError::Server(value) => {
            assert_eq!(value, json!({"code": "quota", "detail": "Too many wheels"}));
        }
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_shared_wheel_without_token_sends_no_header() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/createSharedWheel3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"path": "anon-1"})))
        .mount(&server)
        .await;

    shared::create_shared_wheel(&client, false, &lunch_wheel(), None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_get_shared_wheel_by_path() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getSharedWheel2/abc-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "wheelConfig": {"title": "Lunch", "entries": ["Tacos", "Pho"]}
        })))
        .mount(&server)
        .await;

    let config = shared::get_shared_wheel(&client, "abc-123").await.unwrap();
    assert_eq!(config, lunch_wheel());
}

#[tokio::test]
async fn test_get_shared_wheel_missing_config_is_invalid() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getSharedWheel2/gone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = shared::get_shared_wheel(&client, "gone").await.unwrap_err();
    assert!(matches!(err, FunctionsError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_get_and_delete_shared_wheels() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getSharedWheels"))
        .and(header("authorization", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "wheels": [{"path": "a"}, {"path": "b"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/deleteSharedWheel"))
        .and(header("authorization", TEST_TOKEN))
        .and(body_json(json!({"path": "a"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "wheels": [{"path": "b"}]
        })))
        .mount(&server)
        .await;

    let wheels = shared::get_shared_wheels(&client, TEST_TOKEN).await.unwrap();
    assert_eq!(wheels.len(), 2);

    let remaining = shared::delete_shared_wheel(&client, TEST_TOKEN, "a")
        .await
        .unwrap();
    assert_eq!(remaining, vec![json!({"path": "b"})]);
}

#[tokio::test]
async fn test_log_shared_wheel_read_posts_path() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/logSharedWheelRead"))
        .and(body_json(json!({"path": "abc-123"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let status = shared::log_shared_wheel_read(&client, "abc-123").await;
    assert_eq!(status, BestEffort::Succeeded);
}

#[tokio::test]
async fn test_log_shared_wheel_read_empty_path_is_skipped() {
    let (server, client, _) = setup_functions_mock().await;

    let status = shared::log_shared_wheel_read(&client, "").await;
    assert!(matches!(status, BestEffort::Skipped(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_log_shared_wheel_read_failure_is_absorbed() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/logSharedWheelRead"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let status = shared::log_shared_wheel_read(&client, "abc-123").await;
    assert!(matches!(status, BestEffort::Skipped(_)));
    assert_eq!(tracker.report_count(), 0);
}
