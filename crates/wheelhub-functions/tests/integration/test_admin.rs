//! Admin-gated endpoint tests

use serde_json::json;
use wheelhub_functions::{admin, FunctionsError, ADMIN_REQUIRED_MESSAGE};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{setup_functions_mock, TEST_TOKEN};

#[tokio::test]
async fn test_review_queue_size() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getNumberOfWheelsInReviewQueue"))
        .and(header("authorization", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"wheelsInReviewQueue": 17})))
        .mount(&server)
        .await;

    let size = admin::get_number_of_wheels_in_review_queue(&client, TEST_TOKEN)
        .await
        .unwrap();
    assert_eq!(size, 17);
}

#[tokio::test]
async fn test_review_queue_403_requires_admin_regardless_of_body() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getNumberOfWheelsInReviewQueue"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"wheelsInReviewQueue": 99})),
        )
        .mount(&server)
        .await;

    let err = admin::get_number_of_wheels_in_review_queue(&client, TEST_TOKEN)
        .await
        .unwrap_err();
    assert!(matches!(err, FunctionsError::AdminRequired));
    assert_eq!(err.to_string(), ADMIN_REQUIRED_MESSAGE);
}

#[tokio::test]
async fn test_review_queue_403_with_non_json_body() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getNumberOfWheelsInReviewQueue"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = admin::get_number_of_wheels_in_review_queue(&client, TEST_TOKEN)
        .await
        .unwrap_err();
    assert!(matches!(err, FunctionsError::AdminRequired));
}

#[tokio::test]
async fn test_review_queue_error_field() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/getNumberOfWheelsInReviewQueue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Database offline"})))
        .mount(&server)
        .await;

    let err = admin::get_number_of_wheels_in_review_queue(&client, TEST_TOKEN)
        .await
        .unwrap_err();
    match err {
        FunctionsError::Server(value) => assert_eq!(value, json!("Database offline")),
        other => panic!("expected Server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_translate_sends_entries() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(header("authorization", TEST_TOKEN))
        .and(body_json(json!({"text": ["Spin", "Reset"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translations": {"de": ["Drehen", "Zurücksetzen"]}
        })))
        .mount(&server)
        .await;

    let entries = vec!["Spin".to_string(), "Reset".to_string()];
    let translations = admin::translate(&client, TEST_TOKEN, &entries).await.unwrap();
    assert_eq!(translations["de"][0], "Drehen");
}

#[tokio::test]
async fn test_translate_403_requires_admin() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = admin::translate(&client, TEST_TOKEN, &[]).await.unwrap_err();
    assert!(matches!(err, FunctionsError::AdminRequired));
}

#[tokio::test]
async fn test_user_is_admin() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/userIsAdmin"))
        .and(header("authorization", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"userIsAdmin": true})))
        .mount(&server)
        .await;

    assert!(admin::user_is_admin(&client, TEST_TOKEN).await.unwrap());
}

#[tokio::test]
async fn test_user_is_admin_missing_answer_is_false() {
    let (server, client, _) = setup_functions_mock().await;

    Mock::given(method("GET"))
        .and(path("/userIsAdmin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert!(!admin::user_is_admin(&client, TEST_TOKEN).await.unwrap());
}
