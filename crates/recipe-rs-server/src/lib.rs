//! HTTP boundary for the recipe service.
//!
//! Routes decode ids and JSON bodies into typed values, call the injected
//! [`RecordStore`](recipe_rs_store::RecordStore), and map outcomes to status
//! codes: malformed input is a client error, store failures are server
//! errors, and missing records are 404.

pub mod error;
pub mod routes;
pub mod server;

pub use error::{ApiError, InputError, ServerError};
pub use routes::parse_record_id;
pub use server::{RecipeServer, SharedStore, build_rocket, rocket_config};
