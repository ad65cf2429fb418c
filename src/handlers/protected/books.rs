use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::NewBook;
use crate::database::Document;
use crate::error::ApiError;
use crate::handlers::utils::{json_body, json_object};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /book
pub async fn book_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Document> {
    let book: NewBook = serde_json::from_value(json_body(payload)?)
        .map_err(|e| ApiError::validation_error(format!("Invalid book: {}", e), None))?;

    let created = state.catalog.create(book).await?;
    tracing::info!("{} added book {}", user.email, created.id);
    Ok(ApiResponse::book("Book added successfully!", created).created())
}

/// PUT /book/:id - shallow merge of the body into the stored book
pub async fn book_update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Document> {
    let fields = json_object(payload)?;
    let updated = state.catalog.update(&id, fields).await?;
    tracing::info!("{} updated book {}", user.email, updated.id);
    Ok(ApiResponse::book("Book updated successfully!", updated))
}

/// DELETE /book/:id
pub async fn book_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.catalog.delete(&id).await?;
    tracing::info!("{} deleted book {}", user.email, id);
    Ok(ApiResponse::message("Book deleted successfully!"))
}
