use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;

use super::document::{Document, YamlDocument};
use super::models::{
    sanitize_filename, Day, DaysFile, Prototype, RegistryEntry, RegistryFile, Screenshot,
    StoreError, UploadFile,
};

/// URL prefix the dashboard uses to fetch uploaded screenshots. Mirrored by
/// the static-file route.
pub const IMAGE_URL_PREFIX: &str = "/prototype-images";

/// Store for the day/prototype/screenshot gallery tree.
///
/// Every mutation is one whole-document read-modify-write cycle against
/// `days.yaml`, serialized by `write_lock` so two concurrent writers cannot
/// silently drop each other's update.
pub struct DayStore {
    days: Box<dyn Document<DaysFile>>,
    registry: Box<dyn Document<RegistryFile>>,
    images_root: PathBuf,
    write_lock: Mutex<()>,
}

impl DayStore {
    /// Open the store against the conventional layout under `data_dir`:
    /// `prototypes/days.yaml`, `prototypes/prototype-registry.yaml` and
    /// `prototypes/images/`.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Self {
        let base = data_dir.as_ref().join("prototypes");
        Self::with_documents(
            Box::new(YamlDocument::new(base.join("days.yaml"))),
            Box::new(YamlDocument::new(base.join("prototype-registry.yaml"))),
            base.join("images"),
        )
    }

    /// Build a store from explicit documents. Tests use this with
    /// `MemoryDocument` fakes.
    pub fn with_documents(
        days: Box<dyn Document<DaysFile>>,
        registry: Box<dyn Document<RegistryFile>>,
        images_root: PathBuf,
    ) -> Self {
        Self {
            days,
            registry,
            images_root,
            write_lock: Mutex::new(()),
        }
    }

    pub fn images_root(&self) -> &Path {
        &self.images_root
    }

    /// All days, newest date first.
    pub async fn list_days(&self) -> Result<Vec<Day>, StoreError> {
        Ok(self.days.load().await?.days)
    }

    /// Insert a new empty day. The date must parse as `YYYY-MM-DD` and must
    /// not already be present.
    pub async fn create_day(&self, date: &str) -> Result<Day, StoreError> {
        // Parsing alone accepts unpadded spellings ("2030-1-5"), which would
        // both defeat the string sort and let one calendar day exist twice.
        // Only the canonical zero-padded form is a valid key.
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(parsed) if parsed.format("%Y-%m-%d").to_string() == date => {}
            _ => {
                return Err(StoreError::Validation(format!(
                    "date must be an ISO-8601 date (YYYY-MM-DD), got '{date}'"
                )))
            }
        }

        let _guard = self.write_lock.lock().await;
        let mut file = self.days.load().await?;

        if file.days.iter().any(|d| d.date == date) {
            return Err(StoreError::Conflict(format!("day '{date}' already exists")));
        }

        let day = Day {
            date: date.to_string(),
            prototypes: Vec::new(),
        };
        file.days.push(day.clone());
        // Descending string comparison is correct for zero-padded ISO dates.
        file.days.sort_by(|a, b| b.date.cmp(&a.date));
        self.days.save(&file).await?;

        Ok(day)
    }

    /// Remove a day and everything under it. The image directory for the
    /// date is deleted best-effort after the store write succeeds.
    pub async fn delete_day(&self, date: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.days.load().await?;

        let before = file.days.len();
        file.days.retain(|d| d.date != date);
        if file.days.len() == before {
            return Err(StoreError::NotFound(format!("day '{date}' does not exist")));
        }
        self.days.save(&file).await?;

        self.cleanup_dir(self.images_root.join(date)).await;
        Ok(())
    }

    /// Attach a registry prototype to a day. The display name is resolved
    /// from the registry once, falling back to the raw id for dangling ids.
    pub async fn attach_prototype(
        &self,
        date: &str,
        prototype_id: &str,
    ) -> Result<Prototype, StoreError> {
        if prototype_id.is_empty() {
            return Err(StoreError::Validation(
                "prototypeId must not be empty".to_string(),
            ));
        }

        let _guard = self.write_lock.lock().await;
        let mut file = self.days.load().await?;

        let day = file
            .days
            .iter_mut()
            .find(|d| d.date == date)
            .ok_or_else(|| StoreError::NotFound(format!("day '{date}' does not exist")))?;

        if day.prototypes.iter().any(|p| p.id == prototype_id) {
            return Err(StoreError::Conflict(format!(
                "prototype '{prototype_id}' is already attached to {date}"
            )));
        }

        let name = self
            .registry
            .load()
            .await?
            .prototypes
            .iter()
            .find(|p| p.id == prototype_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| prototype_id.to_string());

        let prototype = Prototype {
            id: prototype_id.to_string(),
            name,
            screenshots: Vec::new(),
        };
        day.prototypes.push(prototype.clone());
        self.days.save(&file).await?;

        Ok(prototype)
    }

    /// Detach a prototype from a day, cascading removal of its image
    /// directory (best-effort).
    pub async fn detach_prototype(&self, date: &str, prototype_id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.days.load().await?;

        let day = file
            .days
            .iter_mut()
            .find(|d| d.date == date)
            .ok_or_else(|| StoreError::NotFound(format!("day '{date}' does not exist")))?;

        let before = day.prototypes.len();
        day.prototypes.retain(|p| p.id != prototype_id);
        if day.prototypes.len() == before {
            return Err(StoreError::NotFound(format!(
                "prototype '{prototype_id}' is not attached to {date}"
            )));
        }
        self.days.save(&file).await?;

        self.cleanup_dir(self.images_root.join(date).join(prototype_id))
            .await;
        Ok(())
    }

    /// Persist uploaded screenshots under `images/<date>/<prototypeId>/` and
    /// append their records to the prototype.
    ///
    /// Every file is MIME-gated before any byte reaches disk. After that,
    /// files are independent: one failed disk write is logged and skipped
    /// while the rest of the batch proceeds. Bytes hit disk before the store
    /// write, so a failed store save can orphan files on disk.
    pub async fn add_screenshots(
        &self,
        date: &str,
        prototype_id: &str,
        files: Vec<UploadFile>,
    ) -> Result<Vec<Screenshot>, StoreError> {
        if files.is_empty() {
            return Err(StoreError::Validation(
                "at least one file is required".to_string(),
            ));
        }
        for file in &files {
            let mime = file.effective_mime();
            if !mime.starts_with("image/") && !mime.starts_with("video/") {
                return Err(StoreError::UnsupportedMedia(format!(
                    "'{}' has type {mime}; only image and video uploads are accepted",
                    file.original_name
                )));
            }
        }

        let _guard = self.write_lock.lock().await;
        let mut store = self.days.load().await?;

        let day = store
            .days
            .iter_mut()
            .find(|d| d.date == date)
            .ok_or_else(|| StoreError::NotFound(format!("day '{date}' does not exist")))?;
        let prototype = day
            .prototypes
            .iter_mut()
            .find(|p| p.id == prototype_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!(
                    "prototype '{prototype_id}' is not attached to {date}"
                ))
            })?;

        let dir = self.images_root.join(date).join(prototype_id);
        tokio::fs::create_dir_all(&dir).await?;

        let mut used: HashSet<String> =
            prototype.screenshots.iter().map(|s| s.filename.clone()).collect();
        let mut added = Vec::new();

        for file in files {
            let sanitized = sanitize_filename(&file.original_name);
            // Two uploads of the same name can land in the same millisecond,
            // so bump the prefix until the name is free.
            let mut millis = Utc::now().timestamp_millis();
            let mut filename = format!("{millis}-{sanitized}");
            while used.contains(&filename) {
                millis += 1;
                filename = format!("{millis}-{sanitized}");
            }

            if let Err(e) = tokio::fs::write(dir.join(&filename), &file.data).await {
                tracing::warn!(
                    date,
                    prototype_id,
                    original_name = %file.original_name,
                    error = %e,
                    "Failed to write screenshot, skipping"
                );
                continue;
            }

            used.insert(filename.clone());
            let screenshot = Screenshot {
                path: format!("{IMAGE_URL_PREFIX}/{date}/{prototype_id}/{filename}"),
                filename,
                original_name: file.original_name,
                uploaded_at: Utc::now(),
            };
            prototype.screenshots.push(screenshot.clone());
            added.push(screenshot);
        }

        if added.is_empty() {
            return Err(StoreError::Io(std::io::Error::other(
                "no file in the batch could be written",
            )));
        }

        self.days.save(&store).await?;
        Ok(added)
    }

    /// Read-only registry catalog.
    pub async fn registry(&self) -> Result<Vec<RegistryEntry>, StoreError> {
        Ok(self.registry.load().await?.prototypes)
    }

    /// Best-effort directory removal used by cascade deletes. Failures are
    /// logged and swallowed so the already-committed store write stands.
    async fn cleanup_dir(&self, dir: PathBuf) {
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Failed to remove image directory");
            }
        }
    }
}
