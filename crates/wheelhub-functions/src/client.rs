//! Server-side function gateway client
//!
//! Provides a typed HTTP client for the functions deployed next to the cloud
//! backend. Handles the authorization header, JSON bodies, endpoint URL
//! construction and response normalization.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use wheelhub_core::ports::NoopTracker;
//! use wheelhub_functions::{client::FunctionsClient, public};
//!
//! # async fn example() {
//! let client = FunctionsClient::new("https://functions.example.com", Arc::new(NoopTracker));
//! let carousels = public::get_carousels(&client).await;
//! println!("{} carousels", carousels.len());
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tracing::debug;
use wheelhub_core::config::FunctionsConfig;
use wheelhub_core::ports::IExceptionTracker;

use crate::FunctionsError;

// ============================================================================
// Endpoint table
// ============================================================================

/// HTTP verb used by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Pure reads
    Get,
    /// Actions
    Post,
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
        }
    }
}

/// A fixed path suffix appended to the configured base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Path suffix, starting with `/`
    pub path: &'static str,
    pub verb: Verb,
    /// `403` from this endpoint means "not an admin"
    pub admin_gated: bool,
}

impl Endpoint {
    const fn get(path: &'static str) -> Self {
        Self {
            path,
            verb: Verb::Get,
            admin_gated: false,
        }
    }

    const fn post(path: &'static str) -> Self {
        Self {
            path,
            verb: Verb::Post,
            admin_gated: false,
        }
    }

    const fn admin_only(self) -> Self {
        Self {
            admin_gated: true,
            ..self
        }
    }

    /// Name used in logs and tracked reports
    pub fn name(&self) -> &'static str {
        self.path.trim_start_matches('/')
    }
}

pub const CREATE_SHARED_WHEEL: Endpoint = Endpoint::post("/createSharedWheel3");
pub const LOG_SHARED_WHEEL_READ: Endpoint = Endpoint::post("/logSharedWheelRead");
pub const GET_SHARED_WHEEL: Endpoint = Endpoint::get("/getSharedWheel2");
pub const GET_SHARED_WHEELS: Endpoint = Endpoint::get("/getSharedWheels");
pub const DELETE_SHARED_WHEEL: Endpoint = Endpoint::post("/deleteSharedWheel");
pub const SOCIAL_MEDIA_USERS: Endpoint = Endpoint::get("/getTwitterUserNames2");
pub const CONVERT_ACCOUNT: Endpoint = Endpoint::post("/convertAccount");
pub const DELETE_ACCOUNT: Endpoint = Endpoint::post("/deleteAccount");
pub const GET_CAROUSELS: Endpoint = Endpoint::get("/getCarousels");
pub const REVIEW_QUEUE_SIZE: Endpoint =
    Endpoint::get("/getNumberOfWheelsInReviewQueue").admin_only();
pub const TRANSLATE: Endpoint = Endpoint::post("/translate").admin_only();
pub const USER_IS_ADMIN: Endpoint = Endpoint::get("/userIsAdmin");
pub const GET_SPIN_STATS: Endpoint = Endpoint::get("/getSpinStats");

// ============================================================================
// FunctionsClient
// ============================================================================

/// Default request timeout when not configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the server-side function gateway
///
/// Wraps `reqwest::Client` with base URL construction, the raw-token
/// `authorization` header and an exception tracker for calls that degrade
/// to a safe default.
pub struct FunctionsClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL every endpoint suffix is appended to (no trailing slash)
    base_url: String,
    /// Receives failures swallowed by best-effort calls
    tracker: Arc<dyn IExceptionTracker>,
}

impl FunctionsClient {
    /// Creates a client for `base_url` with default settings
    pub fn new(base_url: impl Into<String>, tracker: Arc<dyn IExceptionTracker>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
            tracker,
        }
    }

    /// Creates a client from the `functions` config section
    pub fn from_config(
        config: &FunctionsConfig,
        tracker: Arc<dyn IExceptionTracker>,
    ) -> Result<Self, FunctionsError> {
        let timeout = if config.timeout_secs == 0 {
            DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(config.timeout_secs)
        };
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(config.base_url.clone()),
            tracker,
        })
    }

    /// Returns the base URL for requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the exception tracker used by best-effort calls
    pub fn tracker(&self) -> &dyn IExceptionTracker {
        self.tracker.as_ref()
    }

    /// Builds the absolute URL for `endpoint`, optionally followed by one
    /// percent-encoded path segment
    pub fn endpoint_url(
        &self,
        endpoint: &Endpoint,
        segment: Option<&str>,
    ) -> Result<Url, FunctionsError> {
        let raw = format!("{}{}", self.base_url, endpoint.path);
        let mut url =
            Url::parse(&raw).map_err(|e| FunctionsError::InvalidUrl(format!("{raw}: {e}")))?;

        if let Some(segment) = segment {
            url.path_segments_mut()
                .map_err(|_| FunctionsError::InvalidUrl(format!("{raw}: cannot be a base")))?
                .push(segment);
        }
        Ok(url)
    }

    /// Creates a request builder for `endpoint`
    ///
    /// Attaches the token as the `authorization` header when present.
    pub fn request(
        &self,
        endpoint: &Endpoint,
        segment: Option<&str>,
        token: Option<&str>,
    ) -> Result<RequestBuilder, FunctionsError> {
        let url = self.endpoint_url(endpoint, segment)?;
        let mut builder = self.client.request(endpoint.verb.into(), url);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token);
        }
        Ok(builder)
    }

    /// Sends a request and normalizes the JSON response
    ///
    /// - `403` on an admin-gated endpoint becomes [`FunctionsError::AdminRequired`]
    ///   regardless of the body
    /// - a body with an `error` field becomes [`FunctionsError::Server`]
    /// - a non-JSON body becomes [`FunctionsError::InvalidResponse`]
    pub async fn call(
        &self,
        endpoint: &Endpoint,
        segment: Option<&str>,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, FunctionsError> {
        debug!(
            endpoint = endpoint.name(),
            authorized = token.is_some(),
            "Calling function"
        );

        let mut request = self.request(endpoint, segment, token)?;
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        parse_response(endpoint, response).await
    }

    /// Sends a request and discards the response body
    pub async fn fire(
        &self,
        endpoint: &Endpoint,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<StatusCode, FunctionsError> {
        let mut request = self.request(endpoint, None, token)?;
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        Ok(response.status())
    }
}

fn normalize_base_url(mut base_url: String) -> String {
    while base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

async fn parse_response(endpoint: &Endpoint, response: Response) -> Result<Value, FunctionsError> {
    let status = response.status();
    if endpoint.admin_gated && status == StatusCode::FORBIDDEN {
        debug!(endpoint = endpoint.name(), "Admin-gated endpoint returned 403");
        return Err(FunctionsError::AdminRequired);
    }

    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text).map_err(|e| {
        FunctionsError::InvalidResponse(format!(
            "{} returned {status} with a non-JSON body: {e}",
            endpoint.name()
        ))
    })?;

    if let Some(error) = body.get("error") {
        return Err(FunctionsError::Server(error.clone()));
    }
    Ok(body)
}

/// Builds the error for a response that lacks `field`
pub(crate) fn missing_field(endpoint: &Endpoint, field: &str) -> FunctionsError {
    FunctionsError::InvalidResponse(format!("{} response has no `{field}`", endpoint.name()))
}
