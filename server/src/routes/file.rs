use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use camino::Utf8PathBuf;
use eyre::Context;
use tokio_util::io::ReaderStream;

use crate::{
    app_state::SharedState,
    http_error::{ApiError, ApiResult},
    mime_type::guess_mime_type_path,
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/file/:filename", get(get_file))
}

/// Resolve a client-supplied filename inside the download directory,
/// rejecting anything that could walk out of it.
pub(crate) fn resolve_download(
    app_state: &SharedState,
    filename: &str,
) -> Result<Utf8PathBuf, ApiError> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(ApiError::bad_request("invalid filename"));
    }
    Ok(app_state.download_dir.join(filename))
}

#[utoipa::path(get, path = "/file/{filename}",
responses(
    (status = 200, body = String, content_type = "application/octet-stream"),
    (status = NOT_FOUND, description = "File not found or already reclaimed")
        ),
    params(
        ("filename" = String, Path, description = "Name returned by /download or an edit operation")
    )
)]
#[tracing::instrument(skip(app_state))]
pub(crate) async fn get_file(
    Path(filename): Path<String>,
    State(app_state): State<SharedState>,
) -> ApiResult<Response> {
    let path = resolve_download(&app_state, &filename)?;
    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound);
        }
        Err(err) => return Err(err.into()),
    };
    let metadata = file.metadata().await.wrap_err("error reading file metadata")?;

    let mut headers = HeaderMap::new();
    let content_type = guess_mime_type_path(&path)
        .unwrap_or(std::borrow::Cow::Borrowed("application/octet-stream"));
    headers.insert(
        CONTENT_TYPE,
        content_type
            .as_ref()
            .try_into()
            .wrap_err("error setting content-type header")?,
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from(metadata.len()));
    headers.insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .wrap_err("error setting content-disposition header")?,
    );

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);
    Ok((headers, body).into_response())
}
