//! Account lifecycle endpoints
//!
//! Both calls are fire-and-report: a failure is handed to the exception
//! tracker and the caller gets a [`BestEffort`] status.

use serde_json::json;
use tracing::{info, warn};
use wheelhub_core::domain::BestEffort;

use crate::client::{Endpoint, FunctionsClient, CONVERT_ACCOUNT, DELETE_ACCOUNT};
use crate::FunctionsError;

/// Moves the data of an anonymous account onto a newly registered one
///
/// `new_token` authorizes the request; `old_token` identifies the account
/// being merged.
pub async fn convert_account(
    client: &FunctionsClient,
    old_token: &str,
    new_token: &str,
) -> BestEffort {
    let body = json!({ "oldIdToken": old_token });
    let outcome = client
        .call(&CONVERT_ACCOUNT, None, Some(new_token), Some(&body))
        .await;
    settle(client, &CONVERT_ACCOUNT, outcome.map(drop))
}

/// Deletes the account behind `token` along with its data
pub async fn delete_account(client: &FunctionsClient, token: &str) -> BestEffort {
    let outcome = client.call(&DELETE_ACCOUNT, None, Some(token), None).await;
    settle(client, &DELETE_ACCOUNT, outcome.map(drop))
}

fn settle(
    client: &FunctionsClient,
    endpoint: &Endpoint,
    outcome: Result<(), FunctionsError>,
) -> BestEffort {
    match outcome {
        Ok(()) => {
            info!(endpoint = endpoint.name(), "Account request completed");
            BestEffort::Succeeded
        }
        Err(e) => {
            warn!(endpoint = endpoint.name(), error = %e, "Account request failed");
            client.tracker().track_exception(endpoint.name(), &e);
            BestEffort::skipped(e.to_string())
        }
    }
}
