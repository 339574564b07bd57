mod admin;
mod days;
mod documents;
mod simulation;
mod static_files;

use crate::api::response::ApiError;
use crate::store::StoreError;

pub use admin::health;
pub use days::{
    attach_prototype, create_day, delete_day, detach_prototype, list_days, list_registry,
    upload_screenshots,
};
pub use documents::{
    canon_versions, create_scenario, delete_scenario, get_canon, get_conversation, get_scenario,
    list_conversations, list_scenarios, put_canon, put_conversation, put_scenario,
};
pub use simulation::simulate;
pub use static_files::serve_image;

/// Map a StoreError to an ApiError
fn store_error(e: StoreError) -> ApiError {
    match e {
        StoreError::Validation(msg) => ApiError::bad_request(msg),
        StoreError::NotFound(msg) => ApiError::not_found(msg),
        StoreError::Conflict(msg) => ApiError::conflict(msg),
        StoreError::UnsupportedMedia(msg) => ApiError::unsupported_media_type(msg),
        StoreError::Io(e) => ApiError::internal(format!("IO error: {e}")),
        StoreError::Yaml(e) => ApiError::internal(format!("YAML error: {e}")),
        StoreError::Json(e) => ApiError::internal(format!("JSON error: {e}")),
    }
}
