//! Rocket assembly and server lifecycle.

use crate::error::ServerError;
use crate::routes::{catchers, routes};
use log::{error, info};
use recipe_rs_config::ServerConfig;
use recipe_rs_store::RecordStore;
use rocket::config::Shutdown;
use rocket::data::{Limits, ToByteUnit};
use rocket::{Build, Rocket};
use std::sync::Arc;

/// Store handle managed as rocket state and shared by every handler.
pub type SharedStore = Arc<dyn RecordStore>;

/// Translate the service config into rocket's config.
///
/// Rocket stops accepting connections on SIGINT or SIGTERM and gives
/// in-flight requests the configured grace period to finish.
pub fn rocket_config(config: &ServerConfig) -> rocket::Config {
    rocket::Config {
        address: config.address,
        port: config.port,
        keep_alive: config.keep_alive_secs,
        limits: Limits::default().limit("json", config.json_limit_bytes.bytes()),
        shutdown: Shutdown {
            grace: config.shutdown_grace_secs,
            mercy: config.shutdown_mercy_secs,
            ..Shutdown::default()
        },
        ..rocket::Config::default()
    }
}

/// Build an unlaunched rocket with routes, catchers and the store mounted.
pub fn build_rocket(config: &ServerConfig, store: SharedStore) -> Rocket<Build> {
    rocket::custom(rocket_config(config))
        .manage(store)
        .mount("/", routes())
        .register("/", catchers())
}

/// HTTP server bound to a record store.
pub struct RecipeServer {
    config: ServerConfig,
    store: SharedStore,
}

impl RecipeServer {
    pub fn new(config: ServerConfig, store: SharedStore) -> Self {
        Self { config, store }
    }

    /// Serve until a shutdown signal arrives and in-flight requests drain.
    pub async fn run(self) -> Result<(), ServerError> {
        info!(
            "starting recipe server (address={}, port={})",
            self.config.address, self.config.port
        );
        match build_rocket(&self.config, self.store).launch().await {
            Ok(_) => {
                info!("recipe server stopped");
                Ok(())
            }
            Err(err) => {
                error!("recipe server failed: {err}");
                Err(ServerError::Launch(Box::new(err)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::rocket_config;
    use pretty_assertions::assert_eq;
    use recipe_rs_config::ServerConfig;
    use rocket::data::ToByteUnit;

    #[test]
    fn rocket_config_carries_service_settings() {
        let server = ServerConfig {
            port: 8081,
            keep_alive_secs: 60,
            shutdown_grace_secs: 10,
            shutdown_mercy_secs: 2,
            json_limit_bytes: 4096,
            ..ServerConfig::default()
        };
        let config = rocket_config(&server);
        assert_eq!(config.address, server.address);
        assert_eq!(config.port, 8081);
        assert_eq!(config.keep_alive, 60);
        assert_eq!(config.shutdown.grace, 10);
        assert_eq!(config.shutdown.mercy, 2);
        assert_eq!(config.limits.get("json"), Some(4096.bytes()));
    }
}
