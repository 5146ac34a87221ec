use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

use crate::app_state::SharedState;

pub mod download;
pub mod edit;
pub mod file;
pub mod formats;
pub mod upload;

#[utoipa::path(get, path = "/health",
responses(
    (status = 200, description = "Service is up")
        ),
)]
pub(crate) async fn get_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/health", get(get_health))
        .merge(formats::router())
        .merge(download::router())
        .merge(file::router())
        .nest("/api/edit", edit::router())
        .nest("/api", upload::router())
}
