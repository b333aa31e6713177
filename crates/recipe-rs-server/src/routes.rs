//! Route handlers and error catchers.

use crate::error::{ApiError, InputError};
use crate::server::SharedStore;
use log::{info, warn};
use recipe_rs_protocol::{ErrorBody, RecipeAttributes, Record, RecordId};
use rocket::http::Status;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::{Error as JsonError, Json};
use rocket::{Catcher, Request, Route, State, catch, catchers, delete, get, post, put, routes};

/// All recipe routes, mounted at `/`.
pub fn routes() -> Vec<Route> {
    routes![
        list_recipes,
        get_recipe,
        create_recipe,
        update_recipe,
        delete_recipe
    ]
}

/// JSON catchers for responses not produced by a handler.
pub fn catchers() -> Vec<Catcher> {
    catchers![not_found, internal_error, default_catcher]
}

/// Parse a path id: one or more ASCII digits that fit in a record id.
pub fn parse_record_id(raw: &str) -> Result<RecordId, InputError> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(InputError::InvalidId(raw.to_string()));
    }
    raw.parse()
        .map_err(|_| InputError::InvalidId(raw.to_string()))
}

/// Unwrap the JSON data guard result into attributes.
fn decode_body(
    body: Result<Json<RecipeAttributes>, JsonError<'_>>,
) -> Result<RecipeAttributes, InputError> {
    body.map(Json::into_inner)
        .map_err(|err| InputError::InvalidBody(err.to_string()))
}

#[get("/")]
async fn list_recipes(store: &State<SharedStore>) -> Result<Json<Vec<Record>>, ApiError> {
    info!("handle GET recipes");
    let records = store.list_all().await?;
    Ok(Json(records))
}

#[get("/<id>")]
async fn get_recipe(id: &str, store: &State<SharedStore>) -> Result<Json<Record>, ApiError> {
    let id = parse_record_id(id)?;
    info!("handle GET recipe (id={id})");
    match store.get_by_id(id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound(id)),
    }
}

#[post("/", data = "<body>")]
async fn create_recipe(
    body: Result<Json<RecipeAttributes>, JsonError<'_>>,
    store: &State<SharedStore>,
) -> Result<Created<()>, ApiError> {
    info!("handle POST recipes");
    let attributes = decode_body(body)?;
    let inserted = store.create(&attributes).await?;
    info!(
        "created recipe (id={}, rows_affected={})",
        inserted.id, inserted.rows_affected
    );
    Ok(Created::new(format!("/{}", inserted.id)))
}

#[put("/<id>", data = "<body>")]
async fn update_recipe(
    id: &str,
    body: Result<Json<RecipeAttributes>, JsonError<'_>>,
    store: &State<SharedStore>,
) -> Result<NoContent, ApiError> {
    let id = parse_record_id(id)?;
    info!("handle PUT recipe (id={id})");
    let attributes = decode_body(body)?;
    let rows = store.update(id, &attributes).await?;
    if rows == 0 {
        warn!("update matched no rows (id={id})");
        return Err(ApiError::NotFound(id));
    }
    Ok(NoContent)
}

#[delete("/<id>")]
async fn delete_recipe(id: &str, store: &State<SharedStore>) -> Result<NoContent, ApiError> {
    let id = parse_record_id(id)?;
    info!("handle DELETE recipe (id={id})");
    let rows = store.delete(id).await?;
    if rows == 0 {
        warn!("delete matched no rows (id={id})");
        return Err(ApiError::NotFound(id));
    }
    Ok(NoContent)
}

#[catch(404)]
fn not_found(request: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody::new(format!("no route for {}", request.uri())))
}

#[catch(500)]
fn internal_error() -> Json<ErrorBody> {
    Json(ErrorBody::new("internal server error"))
}

#[catch(default)]
fn default_catcher(status: Status, _request: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let reason = status.reason().unwrap_or("unexpected status");
    (status, Json(ErrorBody::new(reason.to_lowercase())))
}

#[cfg(test)]
mod tests {
    use super::parse_record_id;
    use crate::error::InputError;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_digit_ids() {
        assert_eq!(parse_record_id("0"), Ok(0));
        assert_eq!(parse_record_id("42"), Ok(42));
    }

    #[test]
    fn rejects_signs_letters_and_overflow() {
        for raw in ["", "-1", "+1", "1.5", "abc", "99999999999999999999"] {
            assert_eq!(
                parse_record_id(raw),
                Err(InputError::InvalidId(raw.to_string()))
            );
        }
    }
}
