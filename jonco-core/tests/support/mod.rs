//! Shared helpers for driving the API router in-process.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use jonco_core::api::{create_router, AppState};
use jonco_core::media_store::memory::MemoryMediaStore;
use jonco_core::media_store::MediaStore;
use jonco_core::site::memory::MemorySiteRepository;
use serde_json::Value;
use tower::ServiceExt;

/// Initialize tracing for tests
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init();
}

pub struct TestApp {
    pub repo: Arc<MemorySiteRepository>,
    pub media: Option<Arc<MemoryMediaStore>>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(MemorySiteRepository::new(), Some(MemoryMediaStore::new()))
    }

    pub fn with(repo: MemorySiteRepository, media: Option<MemoryMediaStore>) -> Self {
        tracing_init();
        let repo = Arc::new(repo);
        let media = media.map(Arc::new);
        let router = create_router(AppState {
            repo: repo.clone(),
            media: media.clone().map(|m| m as Arc<dyn MediaStore>),
        });
        Self {
            repo,
            media,
            router,
        }
    }

    pub fn media(&self) -> &MemoryMediaStore {
        self.media.as_deref().expect("app built without media store")
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn json(&self, method: Method, uri: &str, payload: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        self.send(req).await
    }
}

/// A `multipart/form-data` body built by hand.
pub struct Form {
    boundary: &'static str,
    body: Vec<u8>,
}

impl Form {
    pub fn new() -> Self {
        Self {
            boundary: "jonco-test-boundary",
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
