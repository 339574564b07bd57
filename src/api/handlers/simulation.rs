use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::store_error;
use crate::api::response::{ApiError, AppJson};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub vignette_id: Option<String>,
    /// Conversation so far. Defaults to a single opening user turn.
    #[serde(default)]
    pub messages: Vec<SimulationMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationMessage {
    pub role: String,
    pub content: String,
}

// ============================================================================
// Handler
// ============================================================================

/// POST /simulate
///
/// Loads the vignette document, builds a streaming chat-completion request
/// and relays the upstream SSE bytes to the client verbatim. No timeout is
/// imposed beyond the upstream's own; termination and error events pass
/// through unmodified.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SimulateRequest>,
) -> Result<Response, ApiError> {
    let vignette_id = req
        .vignette_id
        .ok_or_else(|| ApiError::bad_request("vignetteId field is required"))?;

    let api_key = state
        .config
        .simulation
        .api_key
        .clone()
        .ok_or_else(|| ApiError::unavailable("simulation upstream is not configured"))?;

    let vignette = state.vignettes.get(&vignette_id).await.map_err(store_error)?;

    // The vignette's prompt field becomes the system prompt; a vignette
    // without one is serialized whole so the model still sees its content.
    let system = vignette
        .get("prompt")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| serde_yaml::to_string(&vignette).unwrap_or_default());

    let messages = if req.messages.is_empty() {
        vec![SimulationMessage {
            role: "user".to_string(),
            content: "Begin the simulation.".to_string(),
        }]
    } else {
        req.messages
    };

    let payload = json!({
        "model": state.config.simulation.model,
        "max_tokens": 1024,
        "stream": true,
        "system": system,
        "messages": messages,
    });

    let upstream = state
        .http
        .post(&state.config.simulation.api_url)
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&payload)
        .send()
        .await
        .map_err(|e| ApiError::internal(format!("simulation upstream request failed: {e}")))?;

    let status = upstream.status();
    if !status.is_success() {
        let body = upstream.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %body, "Simulation upstream rejected request");
        return Err(ApiError::internal(format!(
            "simulation upstream returned {status}"
        )));
    }

    tracing::debug!(vignette_id = %vignette_id, "Relaying simulation stream");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| ApiError::internal(format!("failed to build stream response: {e}")))
}
