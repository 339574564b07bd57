use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::api::response::ApiError;
use crate::AppState;

/// Serve an uploaded screenshot or video by its public path.
/// Route: GET /prototype-images/*path
pub async fn serve_image(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(path): axum::extract::Path<String>,
) -> Result<Response, ApiError> {
    // Uploaded filenames are sanitized, so a dot-dot segment here is a
    // crafted request. An empty segment covers the absolute-path case: a
    // leading '/' in the capture would make `join` discard the images root.
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "..")
    {
        return Err(ApiError::bad_request(
            "path must not contain empty or '..' segments",
        ));
    }

    let full_path = state.days.images_root().join(&path);

    let metadata = match tokio::fs::metadata(&full_path).await {
        Ok(m) if m.is_file() => m,
        _ => return Err(ApiError::not_found("File not found")),
    };

    let file = tokio::fs::File::open(&full_path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to open file: {e}")))?;

    let mime_type = mime_guess::from_path(&full_path)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut response =
        (StatusCode::OK, Body::from_stream(ReaderStream::new(file))).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CONTENT_LENGTH, header::HeaderValue::from(metadata.len()));

    // Cache for 1 hour (uploaded files are never rewritten, only replaced
    // under new timestamped names)
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
