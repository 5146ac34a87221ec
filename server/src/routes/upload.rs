use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use eyre::Context;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use vidl_core::util::sanitize_filename;

use crate::{
    app_state::SharedState,
    http_error::{ApiError, ApiResult},
    schema::UploadResponse,
};

// uploads are whole video files, not form fields
const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024 * 1024;

pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/upload",
        post(post_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}

/// Accept a media file and store it in the download directory so the edit
/// operations can work on it. Subject to the same retention sweep as
/// downloads.
#[utoipa::path(post, path = "/api/upload",
request_body(content = String, content_type = "multipart/form-data"),
responses(
    (status = 200, body = UploadResponse),
    (status = 400, description = "No file field in the request")
        ),
)]
#[tracing::instrument(skip(app_state, multipart))]
pub(crate) async fn post_upload(
    State(app_state): State<SharedState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let mut stored_name = field
            .file_name()
            .map(sanitize_filename)
            .unwrap_or_default();
        if stored_name.is_empty() {
            stored_name = "upload.bin".to_owned();
        }
        // unique prefix keeps concurrent uploads of the same file apart
        let filename = format!("{}-{}", Uuid::new_v4(), stored_name);
        let path = app_state.download_dir.join(&filename);

        let mut file = tokio::fs::File::create(&path)
            .await
            .wrap_err("error creating upload file")?;
        let mut written: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| ApiError::bad_request(err.to_string()))?
        {
            written += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .wrap_err("error writing upload")?;
        }
        file.flush().await.wrap_err("error flushing upload")?;
        info!(%filename, bytes = written, "stored upload");
        return Ok(Json(UploadResponse { filename }));
    }
    Err(ApiError::bad_request("missing 'file' field in upload"))
}
