//! Wheel records
//!
//! Wheel configurations are opaque JSON objects owned by the application;
//! the access layer only needs their title. Record types here are what the
//! store adapter hands back after reading documents.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An application-defined wheel configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WheelConfig(Map<String, Value>);

impl WheelConfig {
    /// Wraps a JSON object
    #[must_use]
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    /// Builds a config from any JSON value; non-objects yield `None`
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// The wheel title, or an empty string when unset
    #[must_use]
    pub fn title(&self) -> &str {
        self.0.get("title").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns a copy with the title replaced
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.0.insert("title".to_string(), Value::String(title.into()));
        self
    }

    /// Borrow the raw values
    #[must_use]
    pub fn values(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts into a JSON value
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// A wheel saved to a user's account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWheel {
    pub config: WheelConfig,
    /// Server time of the last save
    pub last_write: Option<String>,
    /// Server time the wheel was last opened
    pub last_read: Option<String>,
    /// Number of times the wheel was opened
    #[serde(default)]
    pub read_count: i64,
}

impl SavedWheel {
    #[must_use]
    pub fn title(&self) -> &str {
        self.config.title()
    }
}

/// A wheel published under a shareable path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedWheel {
    /// Opaque record reference
    pub path: String,
    pub config: WheelConfig,
    /// Whether viewers may copy the wheel into their own account
    #[serde(default)]
    pub copyable: bool,
    /// Moderation state: `pending`, `approved` or `deleted`
    #[serde(default)]
    pub review_status: String,
    pub created: Option<String>,
    pub reviewed_by: Option<String>,
}

/// A user allowed to moderate shared wheels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub uid: String,
    pub name: String,
    /// Lifetime reviews since the last payout reset
    #[serde(default)]
    pub review_count: i64,
    /// Reviews in the current session
    #[serde(default)]
    pub session_reviews: i64,
}

/// A named collection of wheels shown on the landing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carousel {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
