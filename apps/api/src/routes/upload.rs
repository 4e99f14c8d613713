use std::path::PathBuf;

use anyhow::Context;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::{error, info};

use crate::errors::AppError;
use crate::pipeline::naming;
use crate::pipeline::run::PipelineOutcome;
use crate::state::AppState;

const FILE_FIELD: &str = "file";
const SAVE_FAILED: &str = "An error occurred while processing your file. Please try again.";

/// A validated upload and where it will be stored.
struct Upload {
    original_filename: String,
    sanitized_filename: String,
    size: usize,
    stored_path: PathBuf,
    contents: Bytes,
}

/// POST /upload
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PipelineOutcome>, AppError> {
    let multipart = multipart.map_err(|e| {
        info!("Rejected upload without multipart body: {e}");
        AppError::Validation("No file uploaded. Please select a file.".to_string())
    })?;

    let upload = read_upload(multipart, &state).await?;
    info!(
        "Received upload {} ({} bytes)",
        upload.original_filename, upload.size
    );

    if let Err(e) = tokio::fs::write(&upload.stored_path, &upload.contents).await {
        error!("Failed to save upload {}: {e}", upload.stored_path.display());
        return Ok(Json(PipelineOutcome::failure(SAVE_FAILED)));
    }
    track_intake(&state, &upload);

    // Detached from the request future; a dropped connection leaves the run going.
    let orchestrator = state.orchestrator.clone();
    let Upload {
        stored_path,
        sanitized_filename,
        ..
    } = upload;
    let outcome = tokio::spawn(async move {
        orchestrator
            .process(&stored_path, &sanitized_filename)
            .await
    })
    .await
    .context("pipeline task aborted")?;
    Ok(Json(outcome))
}

/// Pulls the `file` part out of the form and validates its name and size.
async fn read_upload(mut multipart: Multipart, state: &AppState) -> Result<Upload, AppError> {
    let too_large = || AppError::PayloadTooLarge(state.config.max_upload_label());

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, too_large()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let original_filename = field.file_name().unwrap_or_default().to_string();
        if original_filename.trim().is_empty() {
            return Err(AppError::Validation(
                "No file selected. Please choose a file to upload.".to_string(),
            ));
        }
        if !naming::allowed_file(&original_filename) {
            return Err(AppError::Validation(format!(
                "Invalid file type. Allowed types are: {}",
                naming::ALLOWED_EXTENSIONS.join(", ")
            )));
        }
        let sanitized_filename = naming::sanitize_filename(&original_filename);
        if sanitized_filename.is_empty() || !naming::allowed_file(&sanitized_filename) {
            return Err(AppError::Validation(
                "Invalid filename. Please rename the file and try again.".to_string(),
            ));
        }

        let contents = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, too_large()))?;
        if contents.len() > state.config.max_upload_bytes {
            return Err(too_large());
        }

        return Ok(Upload {
            size: contents.len(),
            stored_path: state.config.upload_dir.join(&sanitized_filename),
            original_filename,
            sanitized_filename,
            contents,
        });
    }

    Err(AppError::Validation(
        "No file uploaded. Please select a file.".to_string(),
    ))
}

fn multipart_error(e: MultipartError, too_large: AppError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large
    } else {
        AppError::Validation(format!("Failed to read upload: {}", e.body_text()))
    }
}

fn track_intake(state: &AppState, upload: &Upload) {
    let note = if upload.original_filename == upload.sanitized_filename {
        "original upload".to_string()
    } else {
        format!("original upload, renamed from {}", upload.original_filename)
    };
    state.tracker.track(
        &naming::base_name(&upload.stored_path),
        &upload.stored_path,
        "intake",
        "saved",
        &note,
    );
}
