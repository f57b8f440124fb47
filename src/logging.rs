//! Tracing subscriber setup

use crate::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// Install a formatting subscriber.
///
/// `RUST_LOG` wins over `level`; without either, only warnings are shown.
/// Calling this more than once is harmless.
pub fn init(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or("warn").to_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Install the subscriber with the filter saved in the preferences
pub fn init_from_config(config: &AppConfig) {
    init(config.log_level.as_deref());
}
