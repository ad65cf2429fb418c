#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bookcat::auth::TokenConfig;
use bookcat::database::MemoryStore;
use bookcat::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// In-process app over a fresh memory store. The store handle is returned so
/// tests can assert on what was (or was not) written.
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), TokenConfig { secret: TEST_SECRET.to_string() }, 4)
            .expect("test token config is valid");
        Self {
            store,
            router: bookcat::app(state),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self.router.clone().oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Sign up a fresh account and return a bearer token for it.
    pub async fn token(&self) -> String {
        let email = format!("{}@example.com", uuid::Uuid::new_v4());
        assert_eq!(self.signup(&email, "secret").await.status, StatusCode::CREATED);
        let res = self.login(&email, "secret").await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().expect("token in login response").to_string()
    }

    /// Create a book and return its id.
    pub async fn create_book(&self, token: &str, book: Value) -> String {
        let res = self.request(Method::POST, "/book", Some(token), Some(book)).await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
        res.body["book"]["id"].as_str().expect("id in created book").to_string()
    }
}

pub fn book(title: &str, author: &str, genre: &str, publication_date: &str) -> Value {
    json!({
        "title": title,
        "author": author,
        "genre": genre,
        "publicationDate": publication_date,
    })
}

/// The real binary on a free port, backed by the memory store. Killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_bookcat"))
            .args(["--store", "memory", "--host", "127.0.0.1", "--port", &port.to_string()])
            .env("JWT_SECRET", TEST_SECRET)
            .env("SECURITY_BCRYPT_COST", "4")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self { port, base_url, child };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
