use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::naming;
use super::stage::Stage;
use super::tracker::ArtifactRecord;

/// State of one pipeline run, keyed by the upload's base name.
#[derive(Debug)]
pub struct PipelineRun {
    pub id: Uuid,
    pub base_name: String,
    pub original_filename: String,
    pub source_path: PathBuf,
    /// Stage currently executing, or the one that failed.
    pub current_stage: Option<Stage>,
    /// Latest location produced by each completed stage; one per stage.
    pub locations: BTreeMap<Stage, String>,
    /// In-memory document between geo-enrichment and persistence.
    pub document: Option<Value>,
    pub artifacts: Vec<ArtifactRecord>,
}

impl PipelineRun {
    pub fn new(source_path: &Path, original_filename: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            base_name: naming::base_name(source_path),
            original_filename: original_filename.to_string(),
            source_path: source_path.to_path_buf(),
            current_stage: None,
            locations: BTreeMap::new(),
            document: None,
            artifacts: Vec::new(),
        }
    }

    /// Location recorded by `stage`, if it has completed.
    pub fn location(&self, stage: Stage) -> Option<&str> {
        self.locations.get(&stage).map(String::as_str)
    }
}

/// What a successful stage reports back to the loop.
#[derive(Debug)]
pub struct StageOutcome {
    pub location: String,
    pub status: &'static str,
    pub note: String,
}

impl StageOutcome {
    pub fn new(location: impl Into<String>, status: &'static str, note: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            status,
            note: note.into(),
        }
    }
}

/// Uniform result handed back to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

impl PipelineOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            download_file: None,
            download_url: None,
        }
    }

    pub fn completed(filename: &str, download_file: String) -> Self {
        Self {
            success: true,
            message: format!("CV processed successfully: {filename}"),
            download_url: Some(naming::download_url(&download_file)),
            download_file: Some(download_file),
        }
    }
}
