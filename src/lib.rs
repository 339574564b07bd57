//! world-dashboard - REST API for the LifeOS world-building dashboard
//!
//! This crate serves a small team editing world-building artifacts stored as
//! plain files on disk:
//! - YAML canon documents with write-time version snapshots
//! - YAML scenario documents and JSON conversation transcripts
//! - a day-indexed prototype screenshot gallery with multipart upload
//! - a streaming simulation relay to an upstream chat-completion API

pub mod api;
pub mod bundle;
pub mod config;
pub mod store;

use config::Config;
use store::{CanonStore, DayStore, DocFormat, DocumentSet};

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub days: DayStore,
    pub canon: CanonStore,
    pub scenarios: DocumentSet,
    pub conversations: DocumentSet,
    pub vignettes: DocumentSet,
    pub http: reqwest::Client,
}

impl AppState {
    /// Wire up every store against the layout under `config.data_dir`.
    pub fn new(config: Config) -> Self {
        let data_dir = std::path::PathBuf::from(&config.data_dir);
        Self {
            days: DayStore::open(&data_dir),
            canon: CanonStore::open(&data_dir),
            scenarios: DocumentSet::new(data_dir.join("scenarios"), DocFormat::Yaml),
            conversations: DocumentSet::new(data_dir.join("conversations"), DocFormat::Json),
            vignettes: DocumentSet::new(data_dir.join("vignettes"), DocFormat::Yaml),
            http: reqwest::Client::new(),
            config,
        }
    }
}
