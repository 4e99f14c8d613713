pub mod download;
pub mod health;
pub mod index;
pub mod upload;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::errors::{failure_body, INTERNAL_MESSAGE};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index::handle_index))
        .route("/health", get(health::health_handler))
        .route("/upload", post(upload::handle_upload))
        .route("/download/:filename", get(download::handle_download))
        .route(
            "/download-processed/:filename",
            get(download::handle_download_processed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Turns a handler panic into the same JSON failure shape as every other error.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        failure_body(INTERNAL_MESSAGE),
    )
        .into_response()
}
