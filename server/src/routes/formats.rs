use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::info;

use vidl_core::{
    blocklist,
    catalog::{normalize_catalog, select_representative},
    commands::YtDlp,
    extract::ExtractorTrait,
};

use crate::{
    app_state::SharedState,
    http_error::{ApiError, ApiResult},
    schema::{FormatsQuery, VideoInfo},
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/formats", get(get_formats))
}

/// Resolve a URL's catalog and return the representative selection a user
/// picks from.
#[utoipa::path(get, path = "/formats",
responses(
    (status = 200, body = VideoInfo),
    (status = 400, description = "Extraction failed or no usable format"),
    (status = 403, description = "Blocked domain")
        ),
    params(FormatsQuery)
)]
#[tracing::instrument(skip(app_state))]
pub(crate) async fn get_formats(
    Query(query): Query<FormatsQuery>,
    State(app_state): State<SharedState>,
) -> ApiResult<Json<VideoInfo>> {
    let url = query.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("url must not be empty"));
    }
    if blocklist::is_blocked_url(url) {
        return Err(ApiError::BlockedDomain);
    }
    let probe = YtDlp::probe(url, app_state.yt_dlp_bin_path()).await?;
    let partition = normalize_catalog(&probe.formats);
    let selection = select_representative(&partition);
    if selection.is_empty() {
        return Err(ApiError::NoValidFormat);
    }
    info!(
        raw = probe.formats.len(),
        selected = selection.len(),
        "resolved formats"
    );
    Ok(Json(VideoInfo::new(&probe, &selection)))
}
