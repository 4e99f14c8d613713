//! External collaborators consumed by the pipeline orchestrator.
//!
//! Each service sits behind a trait so the orchestrator can be exercised
//! without network calls. `Collaborators` bundles the production
//! implementations (or test fakes) and is built once at startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

pub mod downloads;
#[cfg(test)]
pub mod fakes;
pub mod location;
pub mod parser;
pub mod projects;
pub mod renderer;
pub mod storage;
pub mod summarizer;

/// What a path-producing collaborator hands back: either a bare path or a
/// structured object carrying one under `path`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CollaboratorOutput {
    Path(String),
    Structured { path: Option<String> },
}

impl CollaboratorOutput {
    /// The carried path, or `None` when it is missing or blank.
    pub fn into_path(self) -> Option<PathBuf> {
        let path = match self {
            CollaboratorOutput::Path(p) => p,
            CollaboratorOutput::Structured { path } => path?,
        };
        if path.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

impl From<PathBuf> for CollaboratorOutput {
    fn from(path: PathBuf) -> Self {
        CollaboratorOutput::Path(path.display().to_string())
    }
}

/// Cloud file storage.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Uploads `local_path` under `destination_name` and returns a reference
    /// the parser can fetch, or `None` if storage produced none.
    async fn upload(&self, local_path: &Path, destination_name: &str) -> Result<Option<String>>;
}

/// Third-party CV parsing service.
#[async_trait]
pub trait CvParser: Send + Sync {
    /// `base_name` names the JSON file the parsed result is written to.
    async fn parse(
        &self,
        storage_reference: &str,
        base_name: &str,
    ) -> Result<Option<CollaboratorOutput>>;
}

/// AI summarization over a parsed CV JSON file.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, parsed_json_path: &Path) -> Result<Option<CollaboratorOutput>>;
}

/// Pure, synchronous, in-memory location enrichment.
pub trait LocationClassifier: Send + Sync {
    fn enrich(&self, doc: Value) -> Value;
}

/// Optional project extraction over the in-memory document.
#[async_trait]
pub trait ProjectExtractor: Send + Sync {
    async fn extract(&self, doc: Value) -> Result<Value>;
}

/// Document-template rendering engine.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, enriched_json_path: &Path) -> Result<Option<PathBuf>>;
}

/// Copies a finished document somewhere the user can pick it up.
#[async_trait]
pub trait DownloadsSink: Send + Sync {
    async fn save_to_downloads(&self, output_path: &Path) -> Result<Option<PathBuf>>;
}

/// Every collaborator the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn Storage>,
    pub parser: Arc<dyn CvParser>,
    pub summarizer: Arc<dyn Summarizer>,
    pub locations: Arc<dyn LocationClassifier>,
    /// `None` unless project extraction is enabled.
    pub projects: Option<Arc<dyn ProjectExtractor>>,
    pub renderer: Arc<dyn Renderer>,
    pub downloads: Arc<dyn DownloadsSink>,
}
