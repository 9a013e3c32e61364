/// Database connection and schema bootstrap
pub mod database;

/// Application settings loaded from `orderdesk.toml` and the environment
pub mod settings;
