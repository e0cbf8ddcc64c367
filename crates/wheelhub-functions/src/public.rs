//! Unauthenticated listings and search

use serde_json::{Map, Value};
use tracing::warn;
use wheelhub_core::domain::Carousel;

use crate::client::{FunctionsClient, GET_CAROUSELS, GET_SPIN_STATS, SOCIAL_MEDIA_USERS};
use crate::FunctionsError;

/// Lists landing page carousels
///
/// Any failure is tracked and yields an empty list.
pub async fn get_carousels(client: &FunctionsClient) -> Vec<Carousel> {
    match fetch_carousels(client).await {
        Ok(carousels) => carousels,
        Err(e) => {
            warn!(error = %e, "Failed to load carousels");
            client.tracker().track_exception(GET_CAROUSELS.name(), &e);
            Vec::new()
        }
    }
}

async fn fetch_carousels(client: &FunctionsClient) -> Result<Vec<Carousel>, FunctionsError> {
    let response = client.call(&GET_CAROUSELS, None, None, None).await?;
    serde_json::from_value(response).map_err(|e| {
        FunctionsError::InvalidResponse(format!(
            "{} is not a carousel list: {e}",
            GET_CAROUSELS.name()
        ))
    })
}

/// Aggregated spin statistics
///
/// Any failure is tracked and yields an empty map.
pub async fn get_spin_stats(client: &FunctionsClient) -> Map<String, Value> {
    let outcome = match client.call(&GET_SPIN_STATS, None, None, None).await {
        Ok(Value::Object(stats)) => Ok(stats),
        Ok(other) => Err(FunctionsError::InvalidResponse(format!(
            "{} returned a non-object: {other}",
            GET_SPIN_STATS.name()
        ))),
        Err(e) => Err(e),
    };

    outcome.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load spin stats");
        client.tracker().track_exception(GET_SPIN_STATS.name(), &e);
        Map::new()
    })
}

/// Searches social media accounts matching `term`
pub async fn fetch_social_media_users(
    client: &FunctionsClient,
    term: &str,
) -> Result<Vec<Value>, FunctionsError> {
    match client.call(&SOCIAL_MEDIA_USERS, Some(term), None, None).await? {
        Value::Array(users) => Ok(users),
        other => Err(FunctionsError::InvalidResponse(format!(
            "{} returned a non-list: {other}",
            SOCIAL_MEDIA_USERS.name()
        ))),
    }
}
