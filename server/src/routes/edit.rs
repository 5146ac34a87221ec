use std::str::FromStr;

use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use vidl_core::{
    commands::{FFProbe, FFmpeg},
    edit::{self, ClipWindow, ExportFormat, Overlay},
};

use crate::{
    app_state::SharedState,
    http_error::{ApiError, ApiResult},
    routes::file::resolve_download,
    schema::{
        CommentRequest, CutRequest, DivideRequest, DivideResponse, EditResponse, ExportRequest,
    },
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/cut", post(post_cut))
        .route("/divide", post(post_divide))
        .route("/comment", post(post_comment))
        .route("/export", post(post_export))
}

async fn resolve_existing(
    app_state: &SharedState,
    filename: &str,
) -> Result<camino::Utf8PathBuf, ApiError> {
    let path = resolve_download(app_state, filename)?;
    match tokio::fs::try_exists(&path).await {
        Ok(true) => Ok(path),
        Ok(false) => Err(ApiError::NotFound),
        Err(err) => Err(err.into()),
    }
}

fn window(start: f64, end: f64) -> Result<ClipWindow, ApiError> {
    let window = ClipWindow { start, end };
    window
        .validate()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    Ok(window)
}

/// Trim the clip to the requested window, replacing the file.
#[utoipa::path(post, path = "/api/edit/cut",
request_body = CutRequest,
responses(
    (status = 200, body = EditResponse),
    (status = NOT_FOUND, description = "No such file")
        ),
)]
#[tracing::instrument(skip(app_state))]
pub(crate) async fn post_cut(
    State(app_state): State<SharedState>,
    Json(payload): Json<CutRequest>,
) -> ApiResult<Json<EditResponse>> {
    let path = resolve_existing(&app_state, &payload.filename).await?;
    let window = window(payload.start, payload.end)?;
    edit::cut_clip::<FFmpeg>(&path, &window, app_state.ffmpeg_bin_path()).await?;
    info!(filename = %payload.filename, "cut clip");
    Ok(Json(EditResponse {
        filename: payload.filename,
    }))
}

/// Split the clip into equal-length segments.
#[utoipa::path(post, path = "/api/edit/divide",
request_body = DivideRequest,
responses(
    (status = 200, body = DivideResponse),
    (status = NOT_FOUND, description = "No such file")
        ),
)]
#[tracing::instrument(skip(app_state))]
pub(crate) async fn post_divide(
    State(app_state): State<SharedState>,
    Json(payload): Json<DivideRequest>,
) -> ApiResult<Json<DivideResponse>> {
    if !(2..=50).contains(&payload.segments) {
        return Err(ApiError::bad_request("segments must be between 2 and 50"));
    }
    let path = resolve_existing(&app_state, &payload.filename).await?;
    let parts = edit::divide_clip::<FFmpeg, FFProbe>(
        &path,
        payload.segments,
        app_state.ffmpeg_bin_path(),
        app_state.ffprobe_bin_path(),
    )
    .await?;
    info!(filename = %payload.filename, segments = parts.len(), "divided clip");
    let filenames = parts
        .iter()
        .filter_map(|p| p.file_name())
        .map(str::to_owned)
        .collect();
    Ok(Json(DivideResponse { filenames }))
}

/// Burn a text comment into the video over a time window.
#[utoipa::path(post, path = "/api/edit/comment",
request_body = CommentRequest,
responses(
    (status = 200, body = EditResponse),
    (status = NOT_FOUND, description = "No such file")
        ),
)]
#[tracing::instrument(skip(app_state, payload), fields(filename = %payload.filename))]
pub(crate) async fn post_comment(
    State(app_state): State<SharedState>,
    Json(payload): Json<CommentRequest>,
) -> ApiResult<Json<EditResponse>> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::bad_request("comment text must not be empty"));
    }
    let path = resolve_existing(&app_state, &payload.filename).await?;
    let overlay = Overlay {
        text: payload.text,
        window: window(payload.start, payload.end)?,
    };
    edit::overlay_comment::<FFmpeg>(&path, &overlay, app_state.ffmpeg_bin_path()).await?;
    info!("burned comment into clip");
    Ok(Json(EditResponse {
        filename: payload.filename,
    }))
}

/// Convert the clip into another container.
#[utoipa::path(post, path = "/api/edit/export",
request_body = ExportRequest,
responses(
    (status = 200, body = EditResponse),
    (status = NOT_FOUND, description = "No such file")
        ),
)]
#[tracing::instrument(skip(app_state))]
pub(crate) async fn post_export(
    State(app_state): State<SharedState>,
    Json(payload): Json<ExportRequest>,
) -> ApiResult<Json<EditResponse>> {
    let format = ExportFormat::from_str(&payload.format)
        .map_err(|_| ApiError::bad_request(format!("unsupported format '{}'", payload.format)))?;
    let path = resolve_existing(&app_state, &payload.filename).await?;
    if path.extension() == Some(format.ext().as_str()) {
        return Err(ApiError::bad_request("file is already in that format"));
    }
    let out = edit::export_clip::<FFmpeg>(&path, format, app_state.ffmpeg_bin_path()).await?;
    let filename = out
        .file_name()
        .ok_or_else(|| eyre::eyre!("export produced a path without a file name"))?
        .to_owned();
    info!(%filename, "exported clip");
    Ok(Json(EditResponse { filename }))
}
