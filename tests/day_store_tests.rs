use std::collections::BTreeMap;

use bytes::Bytes;
use world_dashboard::store::models::{
    sanitize_filename, DaysFile, RegistryEntry, RegistryFile, StoreError, UploadFile,
};
use world_dashboard::store::{DayStore, MemoryDocument};

#[test]
fn test_sanitize_filename() {
    assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
    assert_eq!(sanitize_filename("shot (final).png"), "shotfinal.png");
    assert_eq!(sanitize_filename("ok-name_1.PNG"), "ok-name_1.PNG");
    // Degenerate names still land somewhere predictable.
    assert_eq!(sanitize_filename(""), "upload");
    assert_eq!(sanitize_filename("???"), "upload");
    assert_eq!(sanitize_filename(".."), "upload");
}

#[test]
fn test_effective_mime() {
    let declared = UploadFile {
        original_name: "clip.mp4".to_string(),
        content_type: Some("video/quicktime".to_string()),
        data: Bytes::new(),
    };
    assert_eq!(declared.effective_mime(), "video/quicktime");

    // An unhelpful declared type falls back to the extension.
    let guessed = UploadFile {
        original_name: "shot.png".to_string(),
        content_type: Some("application/octet-stream".to_string()),
        data: Bytes::new(),
    };
    assert_eq!(guessed.effective_mime(), "image/png");
}

fn registry_fixture() -> RegistryFile {
    RegistryFile {
        prototypes: vec![
            RegistryEntry {
                id: "glass-hud".to_string(),
                name: "Glass HUD".to_string(),
                extra: BTreeMap::new(),
            },
            RegistryEntry {
                id: "ambient-orb".to_string(),
                name: "Ambient Orb".to_string(),
                extra: BTreeMap::new(),
            },
        ],
    }
}

fn test_store(dir: &tempfile::TempDir) -> DayStore {
    DayStore::with_documents(
        Box::new(MemoryDocument::new(DaysFile::default())),
        Box::new(MemoryDocument::new(registry_fixture())),
        dir.path().join("images"),
    )
}

fn png(name: &str) -> UploadFile {
    UploadFile {
        original_name: name.to_string(),
        content_type: Some("image/png".to_string()),
        data: Bytes::from_static(b"not-actually-a-png"),
    }
}

#[tokio::test]
async fn test_create_and_list_days_sorted_descending() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    store.create_day("2030-10-12").await.unwrap();
    store.create_day("2030-10-14").await.unwrap();
    store.create_day("2030-10-13").await.unwrap();

    let days = store.list_days().await.unwrap();
    let dates: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, vec!["2030-10-14", "2030-10-13", "2030-10-12"]);
    assert_eq!(
        days.iter().filter(|d| d.date == "2030-10-14").count(),
        1,
        "each date appears exactly once"
    );
}

#[tokio::test]
async fn test_create_day_duplicate_conflicts_and_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    store.create_day("2030-10-14").await.unwrap();
    let err = store.create_day("2030-10-14").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    assert_eq!(store.list_days().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_day_rejects_malformed_date() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    for bad in ["not-a-date", "2030-13-40", "14-10-2030", "2030-1-5", ""] {
        let err = store.create_day(bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "{bad:?}");
    }
}

#[tokio::test]
async fn test_create_day_rejects_unpadded_spelling_of_existing_date() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    store.create_day("2030-01-05").await.unwrap();

    // The unpadded spelling parses as the same calendar day; accepting it
    // would put that day in the store twice and break the string sort.
    let err = store.create_day("2030-1-5").await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(store.list_days().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_day_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let err = store.delete_day("2030-01-01").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_attach_resolves_name_from_registry() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();

    let proto = store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();
    assert_eq!(proto.name, "Glass HUD");
    assert!(proto.screenshots.is_empty());
}

#[tokio::test]
async fn test_attach_dangling_id_falls_back_to_raw_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();

    let proto = store
        .attach_prototype("2030-10-14", "not-in-registry")
        .await
        .unwrap();
    assert_eq!(proto.name, "not-in-registry");
}

#[tokio::test]
async fn test_attach_errors() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();
    store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();

    let missing_day = store.attach_prototype("2029-01-01", "glass-hud").await;
    assert!(matches!(missing_day.unwrap_err(), StoreError::NotFound(_)));

    let duplicate = store.attach_prototype("2030-10-14", "glass-hud").await;
    assert!(matches!(duplicate.unwrap_err(), StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_attach_then_detach_removes_prototype_and_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();
    store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();
    store
        .add_screenshots("2030-10-14", "glass-hud", vec![png("shot.png")])
        .await
        .unwrap();

    let proto_dir = dir.path().join("images/2030-10-14/glass-hud");
    assert!(proto_dir.is_dir());

    store
        .detach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();

    let days = store.list_days().await.unwrap();
    assert!(days[0].prototypes.is_empty());
    assert!(!proto_dir.exists(), "image directory must be cascaded away");
}

#[tokio::test]
async fn test_detach_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();

    let err = store
        .detach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_upload_rejects_non_media_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();
    store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();

    let pdf = UploadFile {
        original_name: "paper.pdf".to_string(),
        content_type: Some("application/pdf".to_string()),
        data: Bytes::from_static(b"%PDF-1.4"),
    };
    // Mixed batch: the gate must fire before any byte hits disk.
    let err = store
        .add_screenshots("2030-10-14", "glass-hud", vec![png("ok.png"), pdf])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::UnsupportedMedia(_)));

    assert!(
        !dir.path().join("images/2030-10-14/glass-hud").exists(),
        "nothing may be written when a batch is rejected"
    );
    let days = store.list_days().await.unwrap();
    assert!(days[0].prototypes[0].screenshots.is_empty());
}

#[tokio::test]
async fn test_upload_to_missing_day_or_prototype() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();

    let err = store
        .add_screenshots("2029-01-01", "glass-hud", vec![png("a.png")])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store
        .add_screenshots("2030-10-14", "glass-hud", vec![png("a.png")])
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_upload_identical_names_get_distinct_filenames() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();
    store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();

    let added = store
        .add_screenshots(
            "2030-10-14",
            "glass-hud",
            vec![png("shot.png"), png("shot.png")],
        )
        .await
        .unwrap();

    assert_eq!(added.len(), 2);
    assert_ne!(added[0].filename, added[1].filename);
    assert_eq!(added[0].original_name, "shot.png");
    for shot in &added {
        assert!(shot.filename.ends_with("-shot.png"));
        assert!(shot
            .path
            .starts_with("/prototype-images/2030-10-14/glass-hud/"));
        assert!(dir
            .path()
            .join("images/2030-10-14/glass-hud")
            .join(&shot.filename)
            .is_file());
    }
}

#[tokio::test]
async fn test_upload_sanitizes_hostile_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();
    store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();

    let hostile = UploadFile {
        original_name: "../../escape attempt.png".to_string(),
        content_type: Some("image/png".to_string()),
        data: Bytes::from_static(b"data"),
    };
    let added = store
        .add_screenshots("2030-10-14", "glass-hud", vec![hostile])
        .await
        .unwrap();

    assert!(added[0].filename.ends_with("-....escapeattempt.png"));
    assert!(dir
        .path()
        .join("images/2030-10-14/glass-hud")
        .join(&added[0].filename)
        .is_file());
}

#[tokio::test]
async fn test_delete_day_cascades_whole_image_tree() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);
    store.create_day("2030-10-14").await.unwrap();
    store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();
    store
        .attach_prototype("2030-10-14", "ambient-orb")
        .await
        .unwrap();
    store
        .add_screenshots("2030-10-14", "glass-hud", vec![png("a.png")])
        .await
        .unwrap();
    store
        .add_screenshots("2030-10-14", "ambient-orb", vec![png("b.png")])
        .await
        .unwrap();

    let date_dir = dir.path().join("images/2030-10-14");
    assert!(date_dir.is_dir());

    store.delete_day("2030-10-14").await.unwrap();

    assert!(store.list_days().await.unwrap().is_empty());
    assert!(!date_dir.exists(), "date directory must be cascaded away");
}

#[tokio::test]
async fn test_registry_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = test_store(&dir);

    let entries = store.registry().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "glass-hud");
    assert_eq!(entries[0].name, "Glass HUD");
}

#[tokio::test]
async fn test_file_backed_store_round_trip() {
    // Same contract through YamlDocument instead of the in-memory fake.
    let dir = tempfile::tempdir().unwrap();
    let store = DayStore::open(dir.path());

    store.create_day("2030-10-14").await.unwrap();
    store
        .attach_prototype("2030-10-14", "glass-hud")
        .await
        .unwrap();

    assert!(dir.path().join("prototypes/days.yaml").is_file());

    // A second store over the same directory sees the same data.
    let reopened = DayStore::open(dir.path());
    let days = reopened.list_days().await.unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].prototypes[0].id, "glass-hud");
    // No registry file on disk, so the name fell back to the id.
    assert_eq!(days[0].prototypes[0].name, "glass-hud");
}
