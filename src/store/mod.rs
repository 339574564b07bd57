mod days;
mod document;
mod documents;
pub mod models;

pub use days::{DayStore, IMAGE_URL_PREFIX};
pub use document::{Document, MemoryDocument, YamlDocument};
pub use documents::{CanonStore, DocFormat, DocumentSet, CANON_DOCS};
pub use models::StoreError;
