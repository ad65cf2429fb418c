use axum::extract::{rejection::QueryRejection, Path, Query, State};

use crate::database::Document;
use crate::filter::BookFilter;
use crate::handlers::utils::query_params;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /books - list books, optionally narrowed by search/genre/publicationYear
pub async fn books_list(
    State(state): State<AppState>,
    query: Result<Query<BookFilter>, QueryRejection>,
) -> ApiResult<Vec<Document>> {
    let filter = query_params(query)?;
    let books = state.catalog.list(&filter).await?;
    tracing::debug!("Listed {} books for {:?}", books.len(), filter);
    Ok(ApiResponse::data("Books retrieved successfully!", books))
}

/// GET /book/recent-published
pub async fn books_recent(State(state): State<AppState>) -> ApiResult<Vec<Document>> {
    let books = state.catalog.recent().await?;
    Ok(ApiResponse::new("Recent Published Books retrieved successfully!", "book", books))
}

/// GET /book/:id
pub async fn book_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Document> {
    let book = state.catalog.get(&id).await?;
    Ok(ApiResponse::book("Book details retrieved successfully!", book))
}
