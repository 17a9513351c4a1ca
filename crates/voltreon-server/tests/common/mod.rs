//! Helpers for driving the router in-process.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;
use voltreon::app::App;
use voltreon::config::{StorageKind, VoltreonConfig};
use voltreon_server::{AppState, create_router};

/// A router over a fresh in-memory workspace.
pub fn memory_router() -> Router {
    let mut config = VoltreonConfig::default();
    config.storage.backend = StorageKind::Memory;
    let app = App::from_config(config, PathBuf::from(".")).expect("Failed to build app");
    create_router(AppState::new(app))
}

/// A router over a SQLite workspace rooted at `root`.
pub fn sqlite_router_at(root: &Path) -> Router {
    let config = VoltreonConfig::default();
    let app = App::from_config(config, root.to_path_buf()).expect("Failed to build app");
    create_router(AppState::new(app))
}

/// A router over a SQLite database in a fresh temp directory. Keep the
/// directory alive for as long as the router is used.
pub fn sqlite_router() -> (Router, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let router = sqlite_router_at(dir.path());
    (router, dir)
}

/// Send one request and decode the JSON response.
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    send_raw(router, builder.body(body).unwrap()).await
}

/// Send a prebuilt request and decode the JSON response.
pub async fn send_raw(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "response body is not JSON: {}",
                String::from_utf8_lossy(&bytes)
            )
        })
    };
    (status, value)
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::GET, uri, None).await
}

pub async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Some(body)).await
}

pub async fn put(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(router, Method::PUT, uri, Some(body)).await
}

pub async fn delete(router: &Router, uri: &str) -> (StatusCode, Value) {
    send(router, Method::DELETE, uri, None).await
}

/// Create a project and return its id.
pub async fn create_project(router: &Router, name: &str) -> i64 {
    let (status, body) = post(router, "/api/projects", serde_json::json!({ "name": name })).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

/// Create a ticket and return its id.
pub async fn create_ticket(router: &Router, project: i64, title: &str) -> i64 {
    let (status, body) = post(
        router,
        &format!("/api/projects/{project}/tickets"),
        serde_json::json!({ "title": title }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

/// Add the edge `ticket -> depends_on`, returning the response.
pub async fn add_dependency(
    router: &Router,
    ticket: i64,
    depends_on: i64,
) -> (StatusCode, Value) {
    post(
        router,
        &format!("/api/tickets/{ticket}/dependencies"),
        serde_json::json!({ "dependsOnTicketId": depends_on }),
    )
    .await
}
