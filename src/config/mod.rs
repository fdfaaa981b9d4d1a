//! Configuration management
//!
//! TOML-backed configuration with `${VAR}` environment substitution,
//! `TABLECAST_*` overrides, and validation. Bearer tokens are held in
//! [`SecretString`] so they stay out of logs and memory dumps.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DestinationBackend, DestinationConfig, ExportConfig, ExportFormat,
    LoggingConfig, SourceConfig, TablecastConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
