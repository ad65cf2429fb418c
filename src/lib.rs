pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the full HTTP surface over `state`.
pub fn app(state: AppState) -> Router {
    let enable_cors = state.enable_cors;

    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .merge(book_routes(&state))
        .merge(review_routes(&state))
        .merge(auth_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

// Reads are public. Writes on the same path are merged in with the auth
// guard applied to those methods only.
fn book_routes(state: &AppState) -> Router<AppState> {
    let guard = || from_fn_with_state(state.clone(), require_auth);

    Router::new()
        .route("/books", get(public::books_list))
        .route("/book/recent-published", get(public::books_recent))
        .route("/book", post(protected::book_create).route_layer(guard()))
        .route(
            "/book/:id",
            get(public::book_get).merge(
                axum::routing::put(protected::book_update)
                    .delete(protected::book_delete)
                    .route_layer(guard()),
            ),
        )
}

fn review_routes(state: &AppState) -> Router<AppState> {
    Router::new().route(
        "/comment/:id",
        get(public::reviews_list).merge(
            post(protected::review_append).route_layer(from_fn_with_state(state.clone(), require_auth)),
        ),
    )
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(public::signup))
        .route("/auth/login", post(public::login))
        .route("/user/:email", get(public::user_profile))
}
