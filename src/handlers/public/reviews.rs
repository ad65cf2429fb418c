use axum::extract::{Path, State};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /comment/:id - the book's reviews in the order they were added
pub async fn reviews_list(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Vec<Value>> {
    let reviews = state.catalog.reviews(&id).await?;
    Ok(ApiResponse::data("Reviews retrieved successfully!", reviews))
}
