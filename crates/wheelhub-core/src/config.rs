//! Configuration module for WheelHub.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, environment overrides for deployment settings, validation, defaults,
//! and a builder pattern for programmatic use. Configuration is read once when
//! the facade is constructed and never re-read.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::BackendMode;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for WheelHub.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub functions: FunctionsConfig,
    pub logging: LoggingConfig,
    pub telemetry: TelemetryConfig,
}

/// Cloud database/auth backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Disable every cloud feature; reads return neutral defaults.
    pub basic_mode: bool,
    /// API credential sent with every document request.
    pub api_key: Option<String>,
    /// Host of the document database REST API; the public endpoint when unset.
    pub database_url: Option<String>,
    /// Target deployment (project id).
    pub project_id: Option<String>,
    /// Try to enable local offline persistence after initialization.
    pub offline_persistence: bool,
}

/// Server-side function gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionsConfig {
    /// Base URL every endpoint suffix is appended to.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit one JSON object per event instead of human-readable lines.
    pub json: bool,
}

/// Exception tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Write tracked exceptions to `reports_dir`.
    pub enabled: bool,
    /// Directory for error report files.
    pub reports_dir: PathBuf,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Environment variable names read by [`Config::with_env_overrides`].
pub mod env {
    pub const BASIC_MODE: &str = "BASIC_MODE";
    pub const API_KEY: &str = "CLOUD_API_KEY";
    pub const DATABASE_URL: &str = "CLOUD_DATABASE_URL";
    pub const PROJECT_ID: &str = "CLOUD_PROJECT_ID";
    pub const FUNCTION_PREFIX: &str = "FUNCTION_PREFIX";
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/wheelhub/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("wheelhub")
            .join("config.yaml")
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply deployment settings from `lookup` (usually the environment).
    ///
    /// Unset or empty variables leave the current value untouched.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(flag) = read(env::BASIC_MODE) {
            self.backend.basic_mode = parse_flag(&flag);
        }
        if let Some(v) = read(env::API_KEY) {
            self.backend.api_key = Some(v);
        }
        if let Some(v) = read(env::DATABASE_URL) {
            self.backend.database_url = Some(v);
        }
        if let Some(v) = read(env::PROJECT_ID) {
            self.backend.project_id = Some(v);
        }
        if let Some(v) = read(env::FUNCTION_PREFIX) {
            self.functions.base_url = v;
        }
        self
    }

    /// The backend mode this configuration selects.
    pub fn mode(&self) -> BackendMode {
        BackendMode::from_basic_flag(self.backend.basic_mode)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            basic_mode: false,
            api_key: None,
            database_url: None,
            project_id: None,
            offline_persistence: true,
        }
    }
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            reports_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("wheelhub")
                .join("reports"),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"backend.api_key"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Cloud settings are
    /// only checked when basic mode is off.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- backend ---
        if !self.backend.basic_mode {
            if is_blank(self.backend.api_key.as_deref()) {
                errors.push(ValidationError {
                    field: "backend.api_key".into(),
                    message: "required unless basic_mode is enabled".into(),
                });
            }
            if is_blank(self.backend.project_id.as_deref()) {
                errors.push(ValidationError {
                    field: "backend.project_id".into(),
                    message: "required unless basic_mode is enabled".into(),
                });
            }
            if let Some(raw) = self.backend.database_url.as_deref() {
                if let Err(message) = check_http_url(raw) {
                    errors.push(ValidationError {
                        field: "backend.database_url".into(),
                        message,
                    });
                }
            }

            // --- functions ---
            if let Err(message) = check_http_url(&self.functions.base_url) {
                errors.push(ValidationError {
                    field: "functions.base_url".into(),
                    message,
                });
            }
        }
        if self.functions.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "functions.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn check_http_url(raw: &str) -> Result<(), String> {
    match url::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(format!("unsupported scheme '{}'", url.scheme())),
        Err(e) => Err(format!("invalid URL '{raw}': {e}")),
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use wheelhub_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .api_key("key")
///     .project_id("wheel-demo")
///     .functions_base_url("https://functions.example.com")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- backend ---

    pub fn basic_mode(mut self, enabled: bool) -> Self {
        self.config.backend.basic_mode = enabled;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.backend.api_key = Some(key.into());
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.backend.database_url = Some(url.into());
        self
    }

    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.config.backend.project_id = Some(id.into());
        self
    }

    pub fn offline_persistence(mut self, enabled: bool) -> Self {
        self.config.backend.offline_persistence = enabled;
        self
    }

    // --- functions ---

    pub fn functions_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.functions.base_url = url.into();
        self
    }

    pub fn functions_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.functions.timeout_secs = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    // --- telemetry ---

    pub fn telemetry_enabled(mut self, enabled: bool) -> Self {
        self.config.telemetry.enabled = enabled;
        self
    }

    pub fn telemetry_reports_dir(mut self, dir: PathBuf) -> Self {
        self.config.telemetry.reports_dir = dir;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
