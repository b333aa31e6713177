//! Configuration schema for the recipe service.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// Path value that selects a private in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// Root config for the recipe service.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RecipeConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// HTTP listener and lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Idle keep-alive timeout in seconds; 0 disables keep-alive.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u32,
    /// Time in-flight requests get to finish after a shutdown signal.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u32,
    /// Additional time before open connections are dropped.
    #[serde(default = "default_shutdown_mercy_secs")]
    pub shutdown_mercy_secs: u32,
    /// Maximum accepted JSON request body size.
    #[serde(default = "default_json_limit_bytes")]
    pub json_limit_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            keep_alive_secs: default_keep_alive_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            shutdown_mercy_secs: default_shutdown_mercy_secs(),
            json_limit_bytes: default_json_limit_bytes(),
        }
    }
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    9090
}

fn default_keep_alive_secs() -> u32 {
    120
}

fn default_shutdown_grace_secs() -> u32 {
    30
}

fn default_shutdown_mercy_secs() -> u32 {
    5
}

/// Default JSON body limit (1 MiB).
fn default_json_limit_bytes() -> u64 {
    1024 * 1024
}

/// SQLite database settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Database file path. Absent or `:memory:` selects an in-memory database.
    #[serde(default)]
    pub path: Option<String>,
    /// Number of pooled connections for file databases.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// How long a connection waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Create the recipes table on startup when it is missing.
    #[serde(default = "default_create_schema")]
    pub create_schema: bool,
}

impl DatabaseConfig {
    /// True when the configured database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        match self.path.as_deref() {
            None => true,
            Some(path) => path.trim().is_empty() || path == IN_MEMORY_DATABASE,
        }
    }

    /// Number of connections the pool should open for this database.
    pub fn effective_pool_size(&self) -> usize {
        if self.is_in_memory() {
            1
        } else {
            self.pool_size.max(1)
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
            create_schema: default_create_schema(),
        }
    }
}

fn default_pool_size() -> usize {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_create_schema() -> bool {
    true
}
