//! Shared helpers for HTTP-level tests. Requests are sent straight to the
//! router via tower::ServiceExt, no listener involved.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use world_dashboard::config::{Config, SimulationConfig};
use world_dashboard::{api, AppState};

/// Build an app over a temp data directory, with a small registry seeded on
/// disk so attach can resolve display names.
pub fn build_test_app(data_dir: &Path) -> Router {
    let registry = "prototypes:\n  - id: glass-hud\n    name: Glass HUD\n";
    std::fs::create_dir_all(data_dir.join("prototypes")).unwrap();
    std::fs::write(data_dir.join("prototypes/prototype-registry.yaml"), registry).unwrap();

    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        data_dir: data_dir.to_string_lossy().to_string(),
        max_upload_size: 10 * 1024 * 1024,
        max_upload_files: 5,
        simulation: SimulationConfig::default(),
    };

    api::create_router(Arc::new(AppState::new(config)))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn put_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

/// Build a multipart/form-data body with one `files` part per entry of
/// `(filename, content_type, bytes)`.
pub fn multipart_upload(
    app: Router,
    uri: &str,
    files: &[(&str, &str, &[u8])],
) -> impl std::future::Future<Output = Response<Body>> {
    let mut body = Vec::new();
    for (filename, content_type, data) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    async move { app.oneshot(request).await.unwrap() }
}
