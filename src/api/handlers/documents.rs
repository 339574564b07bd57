use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use super::store_error;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CreatedDocument {
    pub id: String,
}

// ============================================================================
// Canon documents
// ============================================================================

pub async fn get_canon(
    State(state): State<Arc<AppState>>,
    Path(doc): Path<String>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let value = state.canon.get(&doc).await.map_err(store_error)?;
    Ok(JSend::success(value))
}

pub async fn put_canon(
    State(state): State<Arc<AppState>>,
    Path(doc): Path<String>,
    AppJson(value): AppJson<Value>,
) -> Result<Json<JSend<Value>>, ApiError> {
    state.canon.put(&doc, &value).await.map_err(store_error)?;
    tracing::debug!(doc = %doc, "Updated canon document");
    Ok(JSend::success(value))
}

pub async fn canon_versions(
    State(state): State<Arc<AppState>>,
    Path(doc): Path<String>,
) -> Result<Json<JSend<Vec<String>>>, ApiError> {
    let versions = state.canon.versions(&doc).await.map_err(store_error)?;
    Ok(JSend::success(versions))
}

// ============================================================================
// Scenarios
// ============================================================================

pub async fn list_scenarios(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<String>>>, ApiError> {
    let ids = state.scenarios.list().await.map_err(store_error)?;
    Ok(JSend::success(ids))
}

pub async fn create_scenario(
    State(state): State<Arc<AppState>>,
    AppJson(value): AppJson<Value>,
) -> Result<(StatusCode, Json<JSend<CreatedDocument>>), ApiError> {
    let id = uuid::Uuid::new_v4().to_string();
    state.scenarios.put(&id, &value).await.map_err(store_error)?;
    tracing::debug!(scenario_id = %id, "Created scenario");
    Ok(JSend::created(CreatedDocument { id }))
}

pub async fn get_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let value = state.scenarios.get(&id).await.map_err(store_error)?;
    Ok(JSend::success(value))
}

pub async fn put_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(value): AppJson<Value>,
) -> Result<Json<JSend<Value>>, ApiError> {
    state.scenarios.put(&id, &value).await.map_err(store_error)?;
    tracing::debug!(scenario_id = %id, "Updated scenario");
    Ok(JSend::success(value))
}

pub async fn delete_scenario(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    state.scenarios.delete(&id).await.map_err(store_error)?;
    tracing::debug!(scenario_id = %id, "Deleted scenario");
    Ok(JSend::success(()))
}

// ============================================================================
// Conversation transcripts
// ============================================================================

pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<String>>>, ApiError> {
    let ids = state.conversations.list().await.map_err(store_error)?;
    Ok(JSend::success(ids))
}

pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<Value>>, ApiError> {
    let value = state.conversations.get(&id).await.map_err(store_error)?;
    Ok(JSend::success(value))
}

pub async fn put_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(value): AppJson<Value>,
) -> Result<Json<JSend<Value>>, ApiError> {
    state
        .conversations
        .put(&id, &value)
        .await
        .map_err(store_error)?;
    tracing::debug!(conversation_id = %id, "Updated conversation");
    Ok(JSend::success(value))
}
