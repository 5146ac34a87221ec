use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use vidl_core::extract::ExtractError;

/// Everything a handler can fail with, mapped onto a status code and a JSON
/// `{"detail": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("this source is copyright protected and cannot be downloaded")]
    BlockedDomain,
    #[error("{0}")]
    BadRequest(String),
    /// The extraction engine could not resolve the URL; carries its message.
    #[error("error resolving URL: {0}")]
    Extraction(String),
    /// Extraction worked but nothing usable survived normalization+ranking.
    #[error("no valid format found for this URL")]
    NoValidFormat,
    #[error("file not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] eyre::Report),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BlockedDomain => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) | ApiError::Extraction(_) | ApiError::NoValidFormat => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error handling request: {:?}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            // the tool rejecting the URL is the client's problem
            ExtractError::Tool(message) => ApiError::Extraction(message),
            other => ApiError::Internal(other.into()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
