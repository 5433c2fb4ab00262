use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use super::service::ConversionService;
use crate::common::response::ApiError;
use crate::state::AppState;

/// Download one produced file as an attachment
/// Streams the file from the job's output directory
#[utoipa::path(
    get,
    path = "/api/v1/conversions/{job_id}/files/{filename}",
    params(
        ("job_id" = String, Path, description = "Job ID"),
        ("filename" = String, Path, description = "Output file name")
    ),
    responses(
        (status = 200, description = "File Content"),
        (status = 404, description = "Not Found")
    ),
    tag = "Conversion"
)]
pub async fn download_output(
    State(state): State<AppState>,
    Path((job_id, filename)): Path<(String, String)>,
) -> impl IntoResponse {
    let path = match ConversionService::resolve_output(state, &job_id, &filename).await {
        Ok(p) => p,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let file = match tokio::fs::File::open(&path).await {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Failed to open {}: {}", path.display(), e);
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            mime_guess::from_path(&path).first_or_octet_stream().to_string(),
        )
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename.replace('"', "")),
        );

    if let Ok(meta) = file.metadata().await {
        builder = builder.header(header::CONTENT_LENGTH, meta.len());
    }

    let body = Body::from_stream(ReaderStream::new(file));

    builder
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
