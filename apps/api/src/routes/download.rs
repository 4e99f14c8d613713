use std::io::ErrorKind;
use std::path::Path as FsPath;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{error, info};

use crate::errors::AppError;
use crate::pipeline::naming;
use crate::state::AppState;

const DOWNLOAD_FAILED: &str = "Error downloading file. Please try again.";

/// GET /download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if !is_plain_file_name(&filename) {
        error!("Refusing download of {filename:?}");
        return Err(AppError::DownloadUnavailable(DOWNLOAD_FAILED.to_string()));
    }

    let path = state.config.output_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(contents) => {
            info!("Serving download {filename}");
            Ok(attachment(&filename, contents))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!("Error downloading file {}: {e}", path.display());
            Err(AppError::DownloadUnavailable(DOWNLOAD_FAILED.to_string()))
        }
        Err(e) => Err(read_failed(&path, e)),
    }
}

/// GET /download-processed/:filename
///
/// Accepts any artifact name of a run (`cv.pdf`, `cv_enriched.json`) and
/// serves that run's rendered document.
pub async fn handle_download_processed(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let base = naming::base_from_artifact(&filename);
    let processed = naming::processed_file_name(&base);
    if !is_plain_file_name(&processed) {
        return Err(AppError::NotFound(processed));
    }

    let path = state.config.output_dir.join(&processed);
    match tokio::fs::read(&path).await {
        Ok(contents) => {
            info!("Serving processed document {processed}");
            Ok(attachment(&processed, contents))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(processed)),
        Err(e) => Err(read_failed(&path, e)),
    }
}

/// A download that exists but cannot be read is a server fault.
fn read_failed(path: &FsPath, e: std::io::Error) -> AppError {
    AppError::Internal(anyhow::Error::new(e).context(format!("reading {}", path.display())))
}

/// A name that stays inside the outputs directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && naming::sanitize_filename(name) == name
}

fn attachment(filename: &str, contents: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type(filename).to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        contents,
    )
        .into_response()
}

fn content_type(filename: &str) -> &'static str {
    match naming::extension(FsPath::new(filename)).as_deref() {
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("doc") => "application/msword",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
