//! Environment variable overlay for the config loader.

use crate::ConfigError;
use log::debug;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Prefix shared by every recognised variable.
const ENV_PREFIX: &str = "RECIPE_";

const ENV_ADDRESS: &str = "RECIPE_ADDRESS";
const ENV_PORT: &str = "RECIPE_PORT";
const ENV_DATABASE_PATH: &str = "RECIPE_DATABASE_PATH";
const ENV_POOL_SIZE: &str = "RECIPE_POOL_SIZE";
const ENV_BUSY_TIMEOUT_MS: &str = "RECIPE_BUSY_TIMEOUT_MS";

/// Snapshot of `RECIPE_*` variables to layer over the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    vars: BTreeMap<String, String>,
}

impl EnvOverrides {
    /// Capture the `RECIPE_*` variables of the current process.
    pub fn from_env() -> Self {
        Self::from_pairs(std::env::vars())
    }

    /// Build overrides from explicit pairs, keeping only `RECIPE_*` names.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        Self { vars }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Convert the captured variables into a JSON overlay.
    pub(super) fn to_overlay(&self) -> Result<Value, ConfigError> {
        let mut server = Map::new();
        let mut database = Map::new();

        for (name, raw) in &self.vars {
            let raw = raw.trim();
            match name.as_str() {
                ENV_ADDRESS => {
                    let address: IpAddr = raw.parse().map_err(|err| invalid_env(name, err))?;
                    server.insert("address".to_string(), json!(address.to_string()));
                }
                ENV_PORT => {
                    let port: u16 = raw.parse().map_err(|err| invalid_env(name, err))?;
                    server.insert("port".to_string(), json!(port));
                }
                ENV_DATABASE_PATH => {
                    database.insert("path".to_string(), json!(raw));
                }
                ENV_POOL_SIZE => {
                    let size: u64 = raw.parse().map_err(|err| invalid_env(name, err))?;
                    database.insert("pool_size".to_string(), json!(size));
                }
                ENV_BUSY_TIMEOUT_MS => {
                    let timeout: u64 = raw.parse().map_err(|err| invalid_env(name, err))?;
                    database.insert("busy_timeout_ms".to_string(), json!(timeout));
                }
                other => {
                    debug!("ignoring unrecognised environment variable (name={other})");
                }
            }
        }

        let mut overlay = Map::new();
        if !server.is_empty() {
            overlay.insert("server".to_string(), Value::Object(server));
        }
        if !database.is_empty() {
            overlay.insert("database".to_string(), Value::Object(database));
        }
        Ok(Value::Object(overlay))
    }
}

fn invalid_env(name: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnv {
        name: name.to_string(),
        message: err.to_string(),
    }
}
