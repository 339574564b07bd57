use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;

use super::models::StoreError;

/// Canon document names. Anything else on the `/canon/:doc` routes is a 404.
pub const CANON_DOCS: &[&str] = &["setting", "thesis", "domains", "timeline", "facts"];

/// Serialization format of a document directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Yaml,
    Json,
}

impl DocFormat {
    fn extension(self) -> &'static str {
        match self {
            DocFormat::Yaml => "yaml",
            DocFormat::Json => "json",
        }
    }
}

/// A directory of id-keyed documents, each one file. Used for scenarios,
/// conversation transcripts, vignettes and the canon set.
///
/// Documents are surfaced to the API as JSON values regardless of the on-disk
/// format; YAML round-trips through serde.
pub struct DocumentSet {
    dir: PathBuf,
    format: DocFormat,
}

impl DocumentSet {
    pub fn new<P: AsRef<Path>>(dir: P, format: DocFormat) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            format,
        }
    }

    /// Ids are restricted to `[A-Za-z0-9._-]`, with dot-dot ruled out
    /// separately. This is what keeps a crafted id from escaping the
    /// directory.
    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if id.is_empty()
            || id.contains("..")
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(StoreError::Validation(format!(
                "invalid document id '{id}'"
            )));
        }
        Ok(self.dir.join(format!("{id}.{}", self.format.extension())))
    }

    /// All document ids in the directory, sorted.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let suffix = format!(".{}", self.format.extension());
        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(stem) = name.strip_suffix(&suffix) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    pub async fn get(&self, id: &str) -> Result<Value, StoreError> {
        let path = self.path_for(id)?;
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!(
                    "document '{id}' does not exist"
                )))
            }
            Err(e) => return Err(e.into()),
        };

        match self.format {
            DocFormat::Yaml => Ok(serde_yaml::from_str(&text)?),
            DocFormat::Json => Ok(serde_json::from_str(&text)?),
        }
    }

    pub async fn put(&self, id: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let text = match self.format {
            DocFormat::Yaml => serde_yaml::to_string(value)?,
            DocFormat::Json => format!("{}\n", serde_json::to_string_pretty(value)?),
        };
        tokio::fs::write(&path, text).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(
                format!("document '{id}' does not exist"),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// The canon document set: five fixed YAML documents with write-time version
/// snapshots under `canon/versions/`.
pub struct CanonStore {
    docs: DocumentSet,
    versions_dir: PathBuf,
}

impl CanonStore {
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Self {
        let canon_dir = data_dir.as_ref().join("canon");
        Self {
            docs: DocumentSet::new(&canon_dir, DocFormat::Yaml),
            versions_dir: canon_dir.join("versions"),
        }
    }

    fn check_name(name: &str) -> Result<(), StoreError> {
        if CANON_DOCS.contains(&name) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!(
                "'{name}' is not a canon document"
            )))
        }
    }

    pub async fn get(&self, name: &str) -> Result<Value, StoreError> {
        Self::check_name(name)?;
        self.docs.get(name).await
    }

    /// Replace a canon document, snapshotting the previous revision first.
    pub async fn put(&self, name: &str, value: &Value) -> Result<(), StoreError> {
        Self::check_name(name)?;
        self.snapshot(name).await?;
        self.docs.put(name, value).await
    }

    /// Snapshot filenames for one document, newest last.
    pub async fn versions(&self, name: &str) -> Result<Vec<String>, StoreError> {
        Self::check_name(name)?;

        let mut entries = match tokio::fs::read_dir(&self.versions_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let prefix = format!("{name}-");
        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with(&prefix) && file_name.ends_with(".yaml") {
                versions.push(file_name);
            }
        }
        versions.sort();
        Ok(versions)
    }

    /// Copy the current revision into the versions directory. A document that
    /// does not exist yet has nothing to snapshot.
    async fn snapshot(&self, name: &str) -> Result<(), StoreError> {
        let current = self.docs.path_for(name)?;
        if tokio::fs::try_exists(&current).await? {
            tokio::fs::create_dir_all(&self.versions_dir).await?;
            let stamp = Utc::now().timestamp_millis();
            let target = self.versions_dir.join(format!("{name}-{stamp}.yaml"));
            tokio::fs::copy(&current, &target).await?;
        }
        Ok(())
    }
}
