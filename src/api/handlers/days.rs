use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::store_error;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::store::models::{Day, Prototype, RegistryEntry, Screenshot, UploadFile};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateDayRequest {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachPrototypeRequest {
    pub prototype_id: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_days(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<Day>>>, ApiError> {
    let days = state.days.list_days().await.map_err(store_error)?;
    Ok(JSend::success(days))
}

pub async fn create_day(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateDayRequest>,
) -> Result<(StatusCode, Json<JSend<Day>>), ApiError> {
    let date = req
        .date
        .ok_or_else(|| ApiError::bad_request("date field is required"))?;

    let day = state.days.create_day(&date).await.map_err(store_error)?;
    tracing::debug!(date = %day.date, "Created day");
    Ok(JSend::created(day))
}

pub async fn delete_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    state.days.delete_day(&date).await.map_err(store_error)?;
    tracing::debug!(date = %date, "Deleted day");
    Ok(JSend::success(()))
}

pub async fn attach_prototype(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
    AppJson(req): AppJson<AttachPrototypeRequest>,
) -> Result<(StatusCode, Json<JSend<Prototype>>), ApiError> {
    let prototype_id = req
        .prototype_id
        .ok_or_else(|| ApiError::bad_request("prototypeId field is required"))?;

    let prototype = state
        .days
        .attach_prototype(&date, &prototype_id)
        .await
        .map_err(store_error)?;

    tracing::debug!(date = %date, prototype_id = %prototype.id, "Attached prototype");
    Ok(JSend::created(prototype))
}

pub async fn detach_prototype(
    State(state): State<Arc<AppState>>,
    Path((date, prototype_id)): Path<(String, String)>,
) -> Result<Json<JSend<()>>, ApiError> {
    state
        .days
        .detach_prototype(&date, &prototype_id)
        .await
        .map_err(store_error)?;

    tracing::debug!(date = %date, prototype_id = %prototype_id, "Detached prototype");
    Ok(JSend::success(()))
}

/// POST /days/:date/prototypes/:id/screenshots
///
/// Multipart upload on the `files` field. Each part is buffered, gated on
/// count and per-file size here, then handed to the store which applies the
/// MIME gate before anything touches disk.
pub async fn upload_screenshots(
    State(state): State<Arc<AppState>>,
    Path((date, prototype_id)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<JSend<Vec<Screenshot>>>), ApiError> {
    let mut files: Vec<UploadFile> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        if field_name != "files" {
            // Ignore unknown fields
            continue;
        }

        if files.len() >= state.config.max_upload_files {
            return Err(ApiError::bad_request(format!(
                "at most {} files per upload",
                state.config.max_upload_files
            )));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(|s| s.to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

        if data.len() as u64 > state.config.max_upload_size {
            return Err(ApiError::payload_too_large(format!(
                "'{original_name}' exceeds the maximum upload size of {} bytes",
                state.config.max_upload_size
            )));
        }

        files.push(UploadFile {
            original_name,
            content_type,
            data,
        });
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("files field is required"));
    }

    let count = files.len();
    let screenshots = state
        .days
        .add_screenshots(&date, &prototype_id, files)
        .await
        .map_err(store_error)?;

    tracing::debug!(
        date = %date,
        prototype_id = %prototype_id,
        received = count,
        stored = screenshots.len(),
        "Uploaded screenshots"
    );
    Ok(JSend::created(screenshots))
}

pub async fn list_registry(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<RegistryEntry>>>, ApiError> {
    let entries = state.days.registry().await.map_err(store_error)?;
    Ok(JSend::success(entries))
}
