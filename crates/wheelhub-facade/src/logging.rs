//! Tracing bootstrap

use tracing_subscriber::EnvFilter;
use wheelhub_core::config::LoggingConfig;

/// Installs the global `fmt` subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.is_ok()
}
