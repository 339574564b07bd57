//! Static-data bundler: flattens every on-disk source into one JSON blob so
//! the dashboard can deploy serverless, without this API running.

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::store::{CanonStore, DayStore, DocFormat, DocumentSet, StoreError, CANON_DOCS};

/// Collect canon documents, scenarios, conversations, the day gallery and the
/// prototype registry into a single JSON object. Missing sections become
/// empty objects/arrays rather than errors.
pub async fn bundle_data_dir(data_dir: &Path) -> Result<Value, StoreError> {
    let canon_store = CanonStore::open(data_dir);
    let mut canon = Map::new();
    for name in CANON_DOCS {
        match canon_store.get(name).await {
            Ok(value) => {
                canon.insert(name.to_string(), value);
            }
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e),
        }
    }

    let scenarios = collect(&DocumentSet::new(data_dir.join("scenarios"), DocFormat::Yaml)).await?;
    let conversations = collect(&DocumentSet::new(
        data_dir.join("conversations"),
        DocFormat::Json,
    ))
    .await?;

    let day_store = DayStore::open(data_dir);
    let days = day_store.list_days().await?;
    let registry = day_store.registry().await?;

    Ok(json!({
        "canon": Value::Object(canon),
        "scenarios": Value::Object(scenarios),
        "conversations": Value::Object(conversations),
        "days": days,
        "prototypeRegistry": registry,
    }))
}

async fn collect(set: &DocumentSet) -> Result<Map<String, Value>, StoreError> {
    let mut out = Map::new();
    for id in set.list().await? {
        out.insert(id.clone(), set.get(&id).await?);
    }
    Ok(out)
}
