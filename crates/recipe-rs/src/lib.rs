//! Public surface for the recipe service.
//!
//! This crate re-exports the workspace building blocks and provides a small
//! logging helper so embedders and the `recipe-api` binary start the same way.

/// Re-export for convenience.
pub use recipe_rs_config as config;
/// Re-export for convenience.
pub use recipe_rs_protocol as protocol;
pub use recipe_rs_server as server;
/// Re-export for convenience.
pub use recipe_rs_store as store;

/// Initialize env_logger with an `info` default, honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}
