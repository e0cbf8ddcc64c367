//! Admin endpoints
//!
//! The review queue size and translation endpoints answer `403` to
//! non-admin callers, which surfaces as [`FunctionsError::AdminRequired`].

use serde_json::{json, Value};

use crate::client::{
    missing_field, FunctionsClient, REVIEW_QUEUE_SIZE, TRANSLATE, USER_IS_ADMIN,
};
use crate::FunctionsError;

/// Number of shared wheels waiting for review
pub async fn get_number_of_wheels_in_review_queue(
    client: &FunctionsClient,
    token: &str,
) -> Result<u64, FunctionsError> {
    let response = client
        .call(&REVIEW_QUEUE_SIZE, None, Some(token), None)
        .await?;

    response
        .get("wheelsInReviewQueue")
        .and_then(Value::as_u64)
        .ok_or_else(|| missing_field(&REVIEW_QUEUE_SIZE, "wheelsInReviewQueue"))
}

/// Machine-translates `entries`; returns the server's `translations` value
pub async fn translate(
    client: &FunctionsClient,
    token: &str,
    entries: &[String],
) -> Result<Value, FunctionsError> {
    let body = json!({ "text": entries });
    let mut response = client
        .call(&TRANSLATE, None, Some(token), Some(&body))
        .await?;

    match response.get_mut("translations").map(Value::take) {
        Some(Value::Null) | None => Err(missing_field(&TRANSLATE, "translations")),
        Some(translations) => Ok(translations),
    }
}

/// Asks the server whether the token's owner is an admin
///
/// A missing or non-boolean answer counts as `false`.
pub async fn user_is_admin(client: &FunctionsClient, token: &str) -> Result<bool, FunctionsError> {
    let response = client.call(&USER_IS_ADMIN, None, Some(token), None).await?;
    Ok(response
        .get("userIsAdmin")
        .and_then(Value::as_bool)
        .unwrap_or(false))
}
