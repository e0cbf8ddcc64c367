//! Public listing and search tests

use serde_json::json;
use wheelhub_functions::{public, FunctionsError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::setup_functions_mock;

#[tokio::test]
async fn test_get_carousels() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getCarousels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "featured", "wheels": ["a", "b"]},
            {"id": "seasonal", "wheels": []}
        ])))
        .mount(&server)
        .await;

    let carousels = public::get_carousels(&client).await;
    assert_eq!(carousels.len(), 2);
    assert_eq!(carousels[0].id, "featured");
    assert_eq!(tracker.report_count(), 0);
}

#[tokio::test]
async fn test_get_carousels_invalid_body_degrades_and_tracks_once() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getCarousels"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let carousels = public::get_carousels(&client).await;
    assert!(carousels.is_empty());
    assert_eq!(tracker.report_count(), 1);
    assert_eq!(tracker.reports()[0].context, "getCarousels");
}

#[tokio::test]
async fn test_get_spin_stats() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getSpinStats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"today": 42, "total": 9001})))
        .mount(&server)
        .await;

    let stats = public::get_spin_stats(&client).await;
    assert_eq!(stats["total"], 9001);
}

#[tokio::test]
async fn test_get_spin_stats_error_degrades_to_empty() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getSpinStats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "stats unavailable"})))
        .mount(&server)
        .await;

    let stats = public::get_spin_stats(&client).await;
    assert!(stats.is_empty());
    assert_eq!(tracker.report_count(), 1);
}

#[tokio::test]
async fn test_fetch_social_media_users_encodes_term() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getTwitterUserNames2/rust%20lang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"screen_name": "rustlang"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let users = public::fetch_social_media_users(&client, "rust lang")
        .await
        .unwrap();
    assert_eq!(users, vec![json!({"screen_name": "rustlang"})]);
}

#[tokio::test]
async fn test_fetch_social_media_users_propagates_errors() {
    let (server, client, tracker) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getTwitterUserNames2/nobody"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "rate limited"})))
        .mount(&server)
        .await;

    let err = public::fetch_social_media_users(&client, "nobody")
        .await
        .unwrap_err();
    assert!(matches!(err, FunctionsError::Server(_)));
    assert_eq!(tracker.report_count(), 0);
}
