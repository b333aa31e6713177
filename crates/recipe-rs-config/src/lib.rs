//! Configuration models and loading for the recipe service.
//!
//! This crate owns the config schema, validation, and the file/environment
//! layering used by the `recipe-api` binary.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Config source options and the environment overlay.
pub use loader::{ConfigSource, DEFAULT_CONFIG_FILE, EnvOverrides, LoadOptions, LoadedConfig};
/// Configuration schema models.
pub use model::*;
