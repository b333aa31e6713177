//! Config loader layering defaults, a JSON5 file, and environment overrides.
//!
//! Layer precedence (low -> high): built-in defaults, config file,
//! environment. Command-line overrides are applied by the binary on the
//! resulting `RecipeConfig`.

mod env;
mod merge;
mod schema;


pub use env::EnvOverrides;

use crate::{ConfigError, RecipeConfig};
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "recipe-api.json5";

/// Origin of a layer that contributed to the effective config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// JSON5 config file.
    File(PathBuf),
    /// `RECIPE_*` environment variables.
    Env,
}

/// Effective config plus the layers that produced it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged, validated config.
    pub config: RecipeConfig,
    /// Layers applied on top of the defaults, in precedence order.
    pub sources: Vec<ConfigSource>,
}

/// Options controlling config discovery and overrides.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Working directory searched for the default config file.
    pub cwd: PathBuf,
    /// Explicit config path; it must exist when set.
    pub config_path: Option<PathBuf>,
    /// Environment overrides applied after the file.
    pub env: EnvOverrides,
}

impl LoadOptions {
    /// Create options for the provided cwd with no environment overrides.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            config_path: None,
            env: EnvOverrides::default(),
        }
    }

    /// Use an explicit config file instead of the default lookup.
    pub fn with_config_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Apply the given environment overrides.
    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.env = env;
        self
    }
}

impl RecipeConfig {
    /// Load a single config from a path (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let value = read_layer(path.as_ref())?;
        config_from_value(value)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        schema::validate_config_schema(&value, "config")?;
        config_from_value(value)
    }

    /// Load the layered config described by `options`.
    pub fn load(options: LoadOptions) -> Result<LoadedConfig, ConfigError> {
        let mut merged = Value::Object(serde_json::Map::new());
        let mut sources = Vec::new();

        let file = match options.config_path {
            Some(path) => Some(path),
            None => {
                let candidate = options.cwd.join(DEFAULT_CONFIG_FILE);
                if candidate.exists() {
                    Some(candidate)
                } else {
                    debug!(
                        "default config file missing (path={})",
                        candidate.display()
                    );
                    None
                }
            }
        };
        if let Some(path) = file {
            let value = read_layer(&path)?;
            merge::merge_json_values(&mut merged, &value);
            debug!("loaded file layer (path={})", path.display());
            sources.push(ConfigSource::File(path));
        }

        if !options.env.is_empty() {
            let overlay = options.env.to_overlay()?;
            merge::merge_json_values(&mut merged, &overlay);
            debug!("loaded env layer (vars={})", options.env.len());
            sources.push(ConfigSource::Env);
        }

        let config = config_from_value(merged)?;
        info!("config loaded (layers={})", sources.len());
        Ok(LoadedConfig { config, sources })
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid(
                "server.port must be greater than zero".to_string(),
            ));
        }
        if self.server.json_limit_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.json_limit_bytes must be greater than zero".to_string(),
            ));
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid(
                "database.pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read and schema-check a JSON5 layer from disk.
fn read_layer(path: &Path) -> Result<Value, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let value: Value = json5::from_str(&contents)?;
    let label = format!("file({})", path.display());
    schema::validate_config_schema(&value, &label)?;
    Ok(value)
}

fn config_from_value(value: Value) -> Result<RecipeConfig, ConfigError> {
    schema::validate_config_schema(&value, "effective")?;
    let config: RecipeConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
