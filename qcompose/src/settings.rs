//!
//! Runtime settings.
//!
//! Values are read, in increasing precedence, from built-in defaults,
//! an optional TOML file and `QCOMPOSE__*` environment variables
//! (e.g. `QCOMPOSE__DATABASE_URL`).
//!

use std::path::Path;

use serde::Deserialize;

use crate::page::Pageable;
use crate::QResult;

const ENV_PREFIX: &str = "QCOMPOSE";
const DEFAULT_FILE: &str = "qcompose";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub max_connections: u32,
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// `tracing_subscriber::EnvFilter` directives
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/qcompose".to_owned(),
            max_connections: 5,
            default_page_size: 20,
            max_page_size: 100,
            log_filter: "info".to_owned(),
        }
    }
}

impl Settings {
    /// Load from `qcompose.toml` in the working directory, if present.
    pub fn load() -> QResult<Self> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&Path>) -> QResult<Self> {
        let file = match path {
            Some(path) => ::config::File::from(path),
            None => ::config::File::with_name(DEFAULT_FILE).required(false),
        };

        let settings: Settings = ::config::Config::builder()
            .add_source(file)
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        tracing::debug!(
            max_connections = settings.max_connections,
            default_page_size = settings.default_page_size,
            max_page_size = settings.max_page_size,
            "settings loaded"
        );

        Ok(settings)
    }

    /// Page `page`, with the requested size clamped to `max_page_size`.
    pub fn pageable(&self, page: u64, size: Option<u64>) -> QResult<Pageable> {
        let size = size
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);

        Pageable::of_page(page, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QError;

    #[test]
    fn partial_file_keeps_defaults() {
        let path = std::env::temp_dir().join(format!("qcompose-settings-{}.toml", std::process::id()));
        std::fs::write(&path, "max_page_size = 50\nlog_filter = \"qcompose=trace\"\n").unwrap();

        let settings = Settings::load_from(Some(path.as_path())).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.max_page_size, 50);
        assert_eq!(settings.log_filter, "qcompose=trace");
        assert_eq!(settings.default_page_size, Settings::default().default_page_size);
    }

    #[test]
    fn page_size_is_clamped() {
        let settings = Settings::default();

        assert_eq!(settings.pageable(0, None).unwrap().size(), 20);
        assert_eq!(settings.pageable(1, Some(1000)).unwrap().size(), 100);
        assert_eq!(settings.pageable(1, Some(1000)).unwrap().offset(), 100);
        assert!(matches!(
            settings.pageable(0, Some(0)),
            Err(QError::InvalidPageSize)
        ));
    }
}
