//! Error types for the HTTP boundary.

use log::error;
use recipe_rs_protocol::{ErrorBody, RecordId};
use recipe_rs_store::StoreError;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::Request;
use thiserror::Error;

/// Malformed client input detected before the store is called.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// Path id is not a non-negative integer.
    #[error("invalid recipe id: {0:?}")]
    InvalidId(String),
    /// Request body is not a valid attributes document.
    #[error("invalid request body: {0}")]
    InvalidBody(String),
}

/// Outcome of a failed request, rendered as a JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client error (400).
    #[error(transparent)]
    Input(#[from] InputError),
    /// The addressed record does not exist (404).
    #[error("recipe {0} not found")]
    NotFound(RecordId),
    /// Persistence failure (500).
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> Status {
        match self {
            ApiError::Input(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::Store(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let message = match &self {
            ApiError::Store(err) => {
                error!(
                    "store failure (method={}, uri={}): {err}",
                    request.method(),
                    request.uri()
                );
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody::new(message))).respond_to(request)
    }
}

/// Errors returned while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Rocket failed to ignite or launch.
    #[error("server failed: {0}")]
    Launch(#[source] Box<rocket::Error>),
}
