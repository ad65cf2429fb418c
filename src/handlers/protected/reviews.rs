use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::handlers::utils::json_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /comment/:id - append the body, whatever its shape, as one review
pub async fn review_append(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<()> {
    let review = json_body(payload)?;
    state.catalog.append_review(&id, review).await?;
    tracing::debug!("{} reviewed book {}", user.email, id);
    Ok(ApiResponse::message("Review added successfully!"))
}
