//! Shared wheel endpoints

use serde_json::{json, Value};
use tracing::{debug, warn};
use wheelhub_core::domain::{BestEffort, WheelConfig};

use crate::client::{
    missing_field, FunctionsClient, CREATE_SHARED_WHEEL, DELETE_SHARED_WHEEL, GET_SHARED_WHEEL,
    GET_SHARED_WHEELS, LOG_SHARED_WHEEL_READ,
};
use crate::FunctionsError;

/// Publishes a wheel and returns its shareable path
///
/// The token is optional; anonymous shares are accepted by the server.
pub async fn create_shared_wheel(
    client: &FunctionsClient,
    copyable: bool,
    config: &WheelConfig,
    token: Option<&str>,
) -> Result<String, FunctionsError> {
    let body = json!({
        "copyable": copyable,
        "wheelConfig": config.values(),
    });
    let response = client
        .call(&CREATE_SHARED_WHEEL, None, token, Some(&body))
        .await?;

    let path = response
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| missing_field(&CREATE_SHARED_WHEEL, "path"))?;

    debug!(path, copyable, "Created shared wheel");
    Ok(path.to_string())
}

/// Records that a shared wheel was opened
///
/// Never fails: an empty path is skipped and transport errors are logged
/// and absorbed.
pub async fn log_shared_wheel_read(client: &FunctionsClient, path: &str) -> BestEffort {
    if path.is_empty() {
        return BestEffort::skipped("no shared wheel path");
    }

    let body = json!({ "path": path });
    match client.fire(&LOG_SHARED_WHEEL_READ, None, Some(&body)).await {
        Ok(status) if status.is_success() => BestEffort::Succeeded,
        Ok(status) => {
            warn!(path, %status, "Shared wheel read was not logged");
            BestEffort::skipped(format!("server answered {status}"))
        }
        Err(e) => {
            warn!(path, error = %e, "Shared wheel read was not logged");
            BestEffort::skipped(e.to_string())
        }
    }
}

/// Fetches the configuration published under `path`
pub async fn get_shared_wheel(
    client: &FunctionsClient,
    path: &str,
) -> Result<WheelConfig, FunctionsError> {
    let response = client.call(&GET_SHARED_WHEEL, Some(path), None, None).await?;

    response
        .get("wheelConfig")
        .cloned()
        .and_then(WheelConfig::from_value)
        .ok_or_else(|| missing_field(&GET_SHARED_WHEEL, "wheelConfig"))
}

/// Lists the shared wheels created by the token's owner
pub async fn get_shared_wheels(
    client: &FunctionsClient,
    token: &str,
) -> Result<Vec<Value>, FunctionsError> {
    let response = client
        .call(&GET_SHARED_WHEELS, None, Some(token), None)
        .await?;
    wheels_field(&GET_SHARED_WHEELS, response)
}

/// Deletes one of the caller's shared wheels and returns the remaining list
pub async fn delete_shared_wheel(
    client: &FunctionsClient,
    token: &str,
    path: &str,
) -> Result<Vec<Value>, FunctionsError> {
    let body = json!({ "path": path });
    let response = client
        .call(&DELETE_SHARED_WHEEL, None, Some(token), Some(&body))
        .await?;
    wheels_field(&DELETE_SHARED_WHEEL, response)
}

fn wheels_field(
    endpoint: &crate::client::Endpoint,
    mut response: Value,
) -> Result<Vec<Value>, FunctionsError> {
    match response.get_mut("wheels").map(Value::take) {
        Some(Value::Array(wheels)) => Ok(wheels),
        Some(Value::Null) | None => Err(missing_field(endpoint, "wheels")),
        Some(other) => Err(FunctionsError::InvalidResponse(format!(
            "{} returned non-list wheels: {other}",
            endpoint.name()
        ))),
    }
}
