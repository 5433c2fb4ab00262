use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use super::dto::{ConversionResponse, ConvertForm, JobOutputsResponse};
use super::service::ConversionService;
use crate::common::error::{ConvertError, ConvertResult};
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::common::upload::{multipart_error, store_upload};
use crate::infrastructure::storage::registry::JobId;
use crate::pipeline::acquire::{InputSource, validate_upload_name};
use crate::pipeline::plan::PlanDefaults;
use crate::state::AppState;

/// Default bitrate and resolution sets
#[utoipa::path(
    get,
    path = "/api/v1/conversions/defaults",
    responses(
        (status = 200, description = "Defaults applied to empty parameters", body = ApiResponse<PlanDefaults>)
    ),
    tag = "Conversion"
)]
pub async fn get_defaults(State(state): State<AppState>) -> impl IntoResponse {
    ApiSuccess(
        ApiResponse::success(state.config.defaults.clone(), "Defaults retrieved successfully"),
        StatusCode::OK,
    )
}

/// Convert an uploaded file or a remote video into MP3/MP4 variants
///
/// Multipart fields: `media` (file) or `url`, `mode` (`mp3` | `mp4`),
/// `bitrates`, `resolutions`, `video_bitrate`, `audio_bitrate`.
/// Lists are comma-separated; empty lists use the defaults.
#[utoipa::path(
    post,
    path = "/api/v1/conversions",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "All variants produced", body = ApiResponse<ConversionResponse>),
        (status = 400, description = "No input supplied, malformed request, or upload over the size limit"),
        (status = 415, description = "Unsupported file type"),
        (status = 422, description = "A variant failed to convert"),
        (status = 502, description = "Remote download failed"),
        (status = 503, description = "Required external tool missing")
    ),
    tag = "Conversion"
)]
pub async fn create_conversion(State(state): State<AppState>, multipart: Multipart) -> impl IntoResponse {
    // The encoder is needed whatever the input, so check it before reading the body.
    if let Err(e) = ConversionService::ensure_tools(&state, None) {
        return ApiError::from(e).into_response();
    }

    let id = state.registry.allocate();

    let form = match read_form(multipart, &state, &id).await {
        Ok(form) => form,
        Err(e) => return reject(&state, &id, e).await,
    };

    let request = match form.into_request(&state.config) {
        Ok(req) => req,
        Err(e) => return reject(&state, &id, e).await,
    };

    if !matches!(request.source, InputSource::Upload(_)) {
        // A URL won over an upload that was already stored.
        state.registry.discard_uploads(&id).await;
    }

    match ConversionService::convert_job(state, id, request).await {
        Ok(res) => ApiSuccess(
            ApiResponse::success(res, "Conversion completed successfully"),
            StatusCode::CREATED,
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// List the files produced by a job
#[utoipa::path(
    get,
    path = "/api/v1/conversions/{job_id}",
    params(
        ("job_id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job outputs", body = ApiResponse<JobOutputsResponse>),
        (status = 404, description = "Job not found")
    ),
    tag = "Conversion"
)]
pub async fn list_outputs(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match ConversionService::list_outputs(state, &job_id).await {
        Ok(res) => ApiSuccess(ApiResponse::success(res, "Outputs retrieved successfully"), StatusCode::OK)
            .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

async fn reject(state: &AppState, id: &JobId, err: ConvertError) -> Response {
    state.registry.discard_uploads(id).await;
    ApiError::from(err).into_response()
}

/// Read the form, streaming the `media` file into the job's upload
/// directory. The claimed file name is checked before anything is written.
async fn read_form(mut multipart: Multipart, state: &AppState, id: &JobId) -> ConvertResult<ConvertForm> {
    let limit = state.config.max_upload_bytes;
    let mut form = ConvertForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "media" {
            let file_name = field.file_name().unwrap_or("").to_string();
            // An empty file input, or a second file after the first.
            if file_name.is_empty() || form.media.is_some() {
                continue;
            }

            validate_upload_name(&file_name, &state.config)?;
            let upload = store_upload(field, &state.registry.upload_dir(id), limit).await?;
            info!("Received upload '{}' ({} bytes)", upload.file_name, upload.size);
            form.media = Some(upload);
            continue;
        }

        let value = field.text().await.map_err(|e| multipart_error(e, limit))?;

        match name.as_str() {
            "url" | "youtube_url" => form.url = Some(value),
            "mode" => form.mode = Some(value),
            "bitrates" => form.bitrates = Some(value),
            "resolutions" => form.resolutions = Some(value),
            "video_bitrate" => form.video_bitrate = Some(value),
            "audio_bitrate" => form.audio_bitrate = Some(value),
            _ => {}
        }
    }

    Ok(form)
}
