use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-level error taxonomy. Each variant maps to exactly one HTTP status
/// at the API boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Root of `prototypes/days.yaml`. Days stay sorted descending by date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaysFile {
    #[serde(default)]
    pub days: Vec<Day>,
}

/// One dated gallery entry. `date` is a plain `YYYY-MM-DD` string and is the
/// unique key within the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Day {
    pub date: String,
    #[serde(default)]
    pub prototypes: Vec<Prototype>,
}

/// A prototype attached to a day. `name` is copied from the registry at
/// attach time and is not kept in sync afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prototype {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub screenshots: Vec<Screenshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    /// Timestamp-prefixed name of the file on disk.
    pub filename: String,
    /// Name the file was uploaded with, before sanitization.
    pub original_name: String,
    /// Public URL the dashboard uses to display the file.
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Root of `prototypes/prototype-registry.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryFile {
    #[serde(default)]
    pub prototypes: Vec<RegistryEntry>,
}

/// Catalog entry for a prototype. Extra fields (status, links, notes) are
/// preserved round-trip but never interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One file received from a multipart upload, buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub original_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    /// Effective MIME type: the multipart Content-Type when it says something,
    /// otherwise a guess from the original filename's extension.
    pub fn effective_mime(&self) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .or_else(|| {
                mime_guess::from_path(&self.original_name)
                    .first()
                    .map(|m| m.to_string())
            })
            .unwrap_or_else(|| "application/octet-stream".to_string())
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` so an uploaded name can
/// never escape its prototype directory.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    // A name of only stripped characters (or only dots) still needs to land
    // somewhere predictable.
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "upload".to_string()
    } else {
        cleaned
    }
}
