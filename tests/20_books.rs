mod common;

use axum::http::{Method, StatusCode};
use common::{book, TestApp};
use serde_json::{json, Value};

fn titles(body: &Value) -> Vec<String> {
    let mut titles: Vec<String> = body["data"]
        .as_array()
        .expect("data is a list")
        .iter()
        .filter_map(|b| b["title"].as_str().map(str::to_string))
        .collect();
    titles.sort();
    titles
}

async fn seeded() -> (TestApp, String) {
    let app = TestApp::new();
    let token = app.token().await;
    app.create_book(&token, book("The Hobbit", "J.R.R. Tolkien", "Fantasy", "1937-09-21")).await;
    app.create_book(&token, book("Mistborn", "Brandon Sanderson", "Fantasy", "2006-07-17")).await;
    app.create_book(&token, book("Piranesi", "Susanna Clarke", "Fantasy", "2020-09-15")).await;
    app.create_book(&token, book("Project Hail Mary", "Andy Weir", "Sci-Fi", "2021-05-04")).await;
    app.create_book(&token, book("The Vanishing Half", "Brit Bennett", "Literary", "2020-06-02")).await;
    (app, token)
}

#[tokio::test]
async fn list_without_filters_returns_everything() {
    let (app, _) = seeded().await;
    let res = app.get("/books").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Books retrieved successfully!");
    assert_eq!(titles(&res.body).len(), 5);
}

#[tokio::test]
async fn genre_and_year_combine() {
    let (app, _) = seeded().await;
    let res = app.get("/books?genre=Fantasy&publicationYear=2020").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(titles(&res.body), vec!["Piranesi"]);
}

#[tokio::test]
async fn search_is_case_insensitive_across_fields() {
    let (app, _) = seeded().await;
    assert_eq!(titles(&app.get("/books?search=tolk").await.body), vec!["The Hobbit"]);
    assert_eq!(titles(&app.get("/books?search=SCI").await.body), vec!["Project Hail Mary"]);
    assert_eq!(titles(&app.get("/books?search=the").await.body), vec!["The Hobbit", "The Vanishing Half"]);
}

#[tokio::test]
async fn search_treats_pattern_characters_literally() {
    let (app, _) = seeded().await;
    assert!(titles(&app.get("/books?search=.*").await.body).is_empty());
    assert!(titles(&app.get("/books?search=%25").await.body).is_empty());
}

#[tokio::test]
async fn empty_parameters_mean_no_filter() {
    let (app, _) = seeded().await;
    assert_eq!(titles(&app.get("/books?search=&genre=").await.body).len(), 5);
}

#[tokio::test]
async fn recent_is_newest_first() {
    let (app, _) = seeded().await;
    let res = app.get("/book/recent-published").await;
    assert_eq!(res.status, StatusCode::OK);
    let dates: Vec<&str> = res.body["book"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["publicationDate"].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2021-05-04", "2020-09-15", "2020-06-02", "2006-07-17", "1937-09-21"]);
}

#[tokio::test]
async fn recent_is_capped_at_ten() {
    let app = TestApp::new();
    let token = app.token().await;
    for year in 2000..2012 {
        app.create_book(&token, book("t", "a", "g", &format!("{}-01-01", year))).await;
    }
    let res = app.get("/book/recent-published").await;
    let books = res.body["book"].as_array().unwrap();
    assert_eq!(books.len(), 10);
    assert_eq!(books[0]["publicationDate"], "2011-01-01");
}

#[tokio::test]
async fn get_update_delete_lifecycle() {
    let (app, token) = seeded().await;
    let id = app.create_book(&token, book("Dune", "Frank Herbert", "SF", "1965-08-01")).await;

    let res = app.get(&format!("/book/{}", id)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["book"]["title"], "Dune");
    assert_eq!(res.body["book"]["customerReviews"], json!([]));

    let res = app
        .request(Method::PUT, &format!("/book/{}", id), Some(&token), Some(json!({ "genre": "Sci-Fi", "id": "x" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["book"]["id"], id.as_str());
    assert_eq!(res.body["book"]["genre"], "Sci-Fi");
    assert_eq!(res.body["book"]["title"], "Dune");

    let res = app.request(Method::DELETE, &format!("/book/{}", id), Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Book deleted successfully!");

    let res = app.get(&format!("/book/{}", id)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["message"], "Book not found");
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let (app, token) = seeded().await;
    let unknown = uuid::Uuid::new_v4();

    assert_eq!(app.get("/book/not-an-id").await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&format!("/book/{}", unknown)).await.status, StatusCode::NOT_FOUND);

    let res = app.request(Method::DELETE, &format!("/book/{}", unknown), Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app
        .request(Method::PUT, &format!("/book/{}", unknown), Some(&token), Some(json!({ "title": "x" })))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(titles(&app.get("/books").await.body).len(), 5);
}

#[tokio::test]
async fn create_rejects_incomplete_book() {
    let app = TestApp::new();
    let token = app.token().await;
    let res = app.request(Method::POST, "/book", Some(&token), Some(json!({ "title": "Dune" }))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.len(bookcat::database::Collection::Books).await, 0);
}

#[tokio::test]
async fn update_leaves_reviews_alone() {
    let app = TestApp::new();
    let token = app.token().await;
    let id = app.create_book(&token, book("Dune", "Frank Herbert", "SF", "1965-08-01")).await;
    let reviews = format!("/comment/{}", id);

    app.request(Method::POST, &reviews, Some(&token), Some(json!("first"))).await;

    let res = app
        .request(Method::PUT, &format!("/book/{}", id), Some(&token), Some(json!({ "customerReviews": "gone" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["book"]["customerReviews"], json!(["first"]));

    let res = app.request(Method::POST, &reviews, Some(&token), Some(json!("second"))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.get(&reviews).await.body["data"], json!(["first", "second"]));
}
