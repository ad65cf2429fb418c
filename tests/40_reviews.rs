mod common;

use axum::http::{Method, StatusCode};
use bookcat::database::Collection;
use common::{book, TestApp};
use serde_json::json;

#[tokio::test]
async fn reviews_append_in_order() {
    let app = TestApp::new();
    let token = app.token().await;
    let id = app.create_book(&token, book("Dune", "Frank Herbert", "SF", "1965-08-01")).await;
    let path = format!("/comment/{}", id);

    let res = app.request(Method::POST, &path, Some(&token), Some(json!({ "rating": 5, "text": "great" }))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Review added successfully!");
    app.request(Method::POST, &path, Some(&token), Some(json!("short and sweet"))).await;

    let res = app.get(&path).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"], json!([{ "rating": 5, "text": "great" }, "short and sweet"]));
}

#[tokio::test]
async fn review_for_missing_book_creates_nothing() {
    let app = TestApp::new();
    let token = app.token().await;
    let path = format!("/comment/{}", uuid::Uuid::new_v4());

    let res = app.request(Method::POST, &path, Some(&token), Some(json!({ "rating": 1 }))).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.len(Collection::Books).await, 0);

    assert_eq!(app.get(&path).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reviews_of_new_book_are_empty() {
    let app = TestApp::new();
    let token = app.token().await;
    let id = app.create_book(&token, book("Dune", "Frank Herbert", "SF", "1965-08-01")).await;

    let res = app.get(&format!("/comment/{}", id)).await;
    assert_eq!(res.body["data"], json!([]));
}
