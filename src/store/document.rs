use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::models::StoreError;

/// Whole-document accessor: one implementation per backing file. There are no
/// partial updates, every save rewrites the full document.
#[async_trait]
pub trait Document<T>: Send + Sync
where
    T: Send + Sync,
{
    async fn load(&self) -> Result<T, StoreError>;
    async fn save(&self, value: &T) -> Result<(), StoreError>;
}

/// File-backed YAML document. A missing file loads as `T::default()` so a
/// fresh data directory needs no seeding.
pub struct YamlDocument<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> YamlDocument<T> {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T> Document<T> for YamlDocument<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync,
{
    async fn load(&self) -> Result<T, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(serde_yaml::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, value: &T) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_yaml::to_string(value)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

/// In-memory fake for tests that want store semantics without a filesystem.
pub struct MemoryDocument<T> {
    inner: Mutex<T>,
}

impl<T> MemoryDocument<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }
}

impl<T: Default> Default for MemoryDocument<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[async_trait]
impl<T> Document<T> for MemoryDocument<T>
where
    T: Clone + Send + Sync,
{
    async fn load(&self) -> Result<T, StoreError> {
        Ok(self.inner.lock().expect("memory document poisoned").clone())
    }

    async fn save(&self, value: &T) -> Result<(), StoreError> {
        *self.inner.lock().expect("memory document poisoned") = value.clone();
        Ok(())
    }
}
