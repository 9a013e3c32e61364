//! Application settings loading from `orderdesk.toml`.
//!
//! Every field has a default, so an empty or missing file yields a working setup that
//! stores data in `./orderdesk.sqlite`. `DATABASE_URL` in the environment (or `.env`)
//! takes precedence over the file.

use super::database::DEFAULT_DATABASE_URL;
use crate::core::{ids::IdScheme, report::DEFAULT_TOP_CLIENTS};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default settings file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "orderdesk.toml";

/// Configuration structure representing the entire `orderdesk.toml` file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `SeaORM` connection URL of the store
    pub database_url: String,
    /// Size of the connection pool; 1 serialises all writes
    pub max_connections: u32,
    /// Identifier prefixes and padding
    pub ids: IdScheme,
    /// Report defaults
    pub reports: ReportSettings,
}

/// Defaults for the reporting queries
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// How many clients the top-clients report returns
    pub top_clients_limit: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 1,
            ids: IdScheme::default(),
            reports: ReportSettings::default(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_clients_limit: DEFAULT_TOP_CLIENTS,
        }
    }
}

impl Settings {
    /// Replaces file values with those set in the environment.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database_url = url;
        }
        self
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `./orderdesk.toml` when present, defaults otherwise,
/// then applies environment overrides.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed.
pub fn load_default_config() -> Result<Settings> {
    let settings = if Path::new(DEFAULT_CONFIG_FILE).exists() {
        load_config(DEFAULT_CONFIG_FILE)?
    } else {
        tracing::info!("No {DEFAULT_CONFIG_FILE} found, using default settings.");
        Settings::default()
    };
    Ok(settings.with_env_overrides())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            database_url = "sqlite://shop.sqlite?mode=rwc"
            max_connections = 2

            [ids]
            client_prefix = "CL"
            product_prefix = "PR"
            order_prefix = "OR"
            width = 5

            [reports]
            top_clients_limit = 3
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.database_url, "sqlite://shop.sqlite?mode=rwc");
        assert_eq!(settings.max_connections, 2);
        assert_eq!(settings.ids.client_prefix, "CL");
        assert_eq!(settings.ids.width, 5);
        assert_eq!(settings.reports.top_clients_limit, 3);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = toml::from_str("[ids]\norder_prefix = \"SO\"\n").unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.max_connections, 1);
        assert_eq!(settings.ids.client_prefix, "CLT");
        assert_eq!(settings.ids.order_prefix, "SO");
        assert_eq!(settings.reports.top_clients_limit, 5);
    }

    #[test]
    fn test_load_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_config(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, Error::Config { .. }));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "max_connections = \"many\"").unwrap();
        assert!(matches!(
            load_config(&broken).unwrap_err(),
            Error::Config { .. }
        ));
    }
}
