//! Build-time bundler. Usage:
//!
//!     bundle-static [OUTPUT]
//!
//! Reads the data directory from DATA_DIR (default ./data) and writes the
//! flattened JSON blob to OUTPUT (default ./static-data.json).

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use world_dashboard::bundle::bundle_data_dir;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()));
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./static-data.json".to_string());

    let blob = bundle_data_dir(&data_dir).await?;
    let text = serde_json::to_string_pretty(&blob)?;
    tokio::fs::write(&output, format!("{text}\n")).await?;

    info!(
        data_dir = %data_dir.display(),
        output = %output,
        bytes = text.len(),
        "Bundled static data"
    );
    Ok(())
}
