use crate::{
    error::Error,
    patch::Patch,
    repository::ItemRepository,
    store::ItemStore,
};

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

type Repository<S> = State<Arc<ItemRepository<S>>>;

/// Body of `GET /health`.
pub const HEALTHY: &str = "healthy";

impl Error {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            error if error.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match status {
            StatusCode::NOT_FOUND => "Item not found".to_string(),
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %self, "request failed");
                "An error occurred".to_string()
            }
            _ => self.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Routes of the item API over `repository`.
///
/// | Route | Success |
/// |---|---|
/// | `GET /health` | 200 `healthy` |
/// | `GET /items` | 200, every item |
/// | `GET /items/{id}` | 200, the item |
/// | `POST /items` | 201 |
/// | `PUT /items/{id}` | 201, the updated item (`null` when nothing was written) |
/// | `DELETE /items/{id}` | 200 |
///
/// Errors are JSON objects with a single `error` field: 400 for unusable input, 404 when
/// the item does not exist and 500 for store failures.
pub fn router<S: ItemStore + 'static>(repository: Arc<ItemRepository<S>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/items", get(list_items::<S>).post(create_item::<S>))
        .route(
            "/items/{id}",
            get(get_item::<S>)
                .put(update_item::<S>)
                .delete(delete_item::<S>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(repository)
}

async fn health() -> &'static str {
    HEALTHY
}

async fn list_items<S: ItemStore>(
    State(repository): Repository<S>,
) -> Result<Json<Vec<Value>>, Error> {
    let items = repository.list().await?;
    Ok(Json(items))
}

async fn get_item<S: ItemStore>(
    State(repository): Repository<S>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Error> {
    match repository.get(&id).await? {
        Some(item) => Ok(Json(item)),
        None => Err(Error::NotFound(id)),
    }
}

async fn create_item<S: ItemStore>(
    State(repository): Repository<S>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(item) = body?;
    let id = repository.create(item).await?;
    let mut body = json!({ "message": "Item created successfully" });
    body[repository.key_name()] = Value::String(id);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn update_item<S: ItemStore>(
    State(repository): Repository<S>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(value) = body?;
    let patch = Patch::try_from(value)?;
    let outcome = repository.update(&id, patch).await?;
    let body = json!({
        "message": "Item updated successfully",
        "updatedItem": outcome.into_item(),
    });
    Ok((StatusCode::CREATED, Json(body)))
}

async fn delete_item<S: ItemStore>(
    State(repository): Repository<S>,
    Path(id): Path<String>,
) -> Result<Json<Value>, Error> {
    repository.delete(&id).await?;
    Ok(Json(json!({ "message": "Item deleted successfully" })))
}
