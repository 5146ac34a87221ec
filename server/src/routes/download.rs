use axum::{extract::State, routing::post, Json, Router};
use tracing::info;

use vidl_core::{
    blocklist,
    commands::YtDlp,
    extract::{DownloadJob, ExtractorTrait},
};

use crate::{
    app_state::SharedState,
    http_error::{ApiError, ApiResult},
    schema::{DownloadRequest, DownloadResponse},
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/download", post(post_download))
}

/// Fetch one encoding of a URL into the download directory and report the
/// final filename. The file stays available on `/file/{filename}` until the
/// sweeper reclaims it.
#[utoipa::path(post, path = "/download",
request_body = DownloadRequest,
responses(
    (status = 200, body = DownloadResponse),
    (status = 400, description = "Extraction or download failed"),
    (status = 403, description = "Blocked domain")
        ),
)]
#[tracing::instrument(skip(app_state, payload), fields(format = %payload.format))]
pub(crate) async fn post_download(
    State(app_state): State<SharedState>,
    Json(payload): Json<DownloadRequest>,
) -> ApiResult<Json<DownloadResponse>> {
    let url = payload.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("url must not be empty"));
    }
    if blocklist::is_blocked_url(url) {
        return Err(ApiError::BlockedDomain);
    }
    info!(url, format = %payload.format, "starting download");
    let job = DownloadJob {
        url,
        format: &payload.format,
        download_dir: &app_state.download_dir,
    };
    let media = YtDlp::download(&job, app_state.yt_dlp_bin_path()).await?;
    info!(filename = %media.filename, "download finished");
    Ok(Json(DownloadResponse {
        filename: media.filename,
        format: payload.format,
        title: media.title,
        duration: media.duration,
        thumbnail: media.thumbnail,
    }))
}
