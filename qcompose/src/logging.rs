//!
//! Structured logging setup.
//!

use std::sync::Once;

use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

static INIT: Once = Once::new();

/// Install a global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more
/// than once, or after another subscriber was installed, is harmless.
pub fn init(default_filter: &str) {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        let result = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        if result.is_err() {
            tracing::debug!("global tracing subscriber already installed");
        }
    });
}

pub fn init_with(settings: &Settings) {
    init(&settings.log_filter);
}
