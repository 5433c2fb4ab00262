use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use crate::config::settings::MULTIPART_OVERHEAD_BYTES;
use crate::state::AppState;

pub mod download_handler;
pub mod dto;
pub mod handler;
pub mod model;
pub mod service;

pub fn router(state: AppState) -> axum::Router<AppState> {
    // The file itself is capped while it streams; the body limit leaves
    // room for boundaries and the text fields.
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let uploads = Router::new()
        .route("/conversions", post(handler::create_conversion))
        .layer(DefaultBodyLimit::max(body_limit));

    let reads = Router::new()
        .route("/conversions/defaults", get(handler::get_defaults))
        .route("/conversions/{job_id}", get(handler::list_outputs))
        .route(
            "/conversions/{job_id}/files/{filename}",
            get(download_handler::download_output),
        );

    uploads.merge(reads)
}
