use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Whole-body ceiling for a full batch, plus slack for multipart framing.
    // Saturating: oversized env values must not panic the router build.
    let upload_limit = (state.config.max_upload_size as usize)
        .saturating_mul(state.config.max_upload_files)
        .saturating_add(1024 * 1024);

    Router::new()
        // Day gallery
        .route("/days", get(handlers::list_days))
        .route("/days", post(handlers::create_day))
        .route("/days/registry/prototypes", get(handlers::list_registry))
        .route("/days/:date", delete(handlers::delete_day))
        .route("/days/:date/prototypes", post(handlers::attach_prototype))
        .route(
            "/days/:date/prototypes/:id",
            delete(handlers::detach_prototype),
        )
        .route(
            "/days/:date/prototypes/:id/screenshots",
            post(handlers::upload_screenshots).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Uploaded screenshot/video content
        .route("/prototype-images/*path", get(handlers::serve_image))
        // Canon documents
        .route("/canon/:doc", get(handlers::get_canon))
        .route("/canon/:doc", put(handlers::put_canon))
        .route("/canon/:doc/versions", get(handlers::canon_versions))
        // Scenarios
        .route("/scenarios", get(handlers::list_scenarios))
        .route("/scenarios", post(handlers::create_scenario))
        .route("/scenarios/:id", get(handlers::get_scenario))
        .route("/scenarios/:id", put(handlers::put_scenario))
        .route("/scenarios/:id", delete(handlers::delete_scenario))
        // Conversation transcripts
        .route("/conversations", get(handlers::list_conversations))
        .route("/conversations/:id", get(handlers::get_conversation))
        .route("/conversations/:id", put(handlers::put_conversation))
        // Simulation relay
        .route("/simulate", post(handlers::simulate))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
