use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use recipe_rs::config::{EnvOverrides, LoadOptions, RecipeConfig};
use recipe_rs::server::RecipeServer;
use recipe_rs::store::SqliteRecordStore;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Recipe CRUD service backed by SQLite.
#[derive(Debug, Parser)]
#[command(name = "recipe-api", version, about)]
struct Cli {
    /// Config file (defaults to ./recipe-api.json5 when present)
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Address to bind
    #[arg(long)]
    address: Option<IpAddr>,
    /// Port to listen on
    #[arg(long, short)]
    port: Option<u16>,
    /// SQLite database path; `:memory:` keeps data in memory
    #[arg(long)]
    database: Option<String>,
}

impl Cli {
    fn apply(&self, config: &mut RecipeConfig) {
        if let Some(address) = self.address {
            config.server.address = address;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(database) = &self.database {
            config.database.path = Some(database.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    recipe_rs::init_logging();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut options = LoadOptions::new(cwd).with_env(EnvOverrides::from_env());
    if let Some(path) = &cli.config {
        options = options.with_config_path(path);
    }
    let loaded = RecipeConfig::load(options).context("failed to load config")?;
    let mut config = loaded.config;
    cli.apply(&mut config);
    config.validate().context("invalid command-line overrides")?;
    info!(
        "configuration resolved (layers={}, database={})",
        loaded.sources.len(),
        config.database.path.as_deref().unwrap_or(":memory:")
    );

    let store = SqliteRecordStore::open(&config.database).context("failed to open database")?;
    RecipeServer::new(config.server, Arc::new(store))
        .run()
        .await
        .context("server exited with error")?;
    Ok(())
}
