//! In-memory collaborators for orchestrator and route tests.
//!
//! They write real files into a scratch directory so the stages that read
//! intermediate JSON behave as they do in production.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::location::RegionClassifier;
use super::projects::PROJECTS_FIELD;
use super::{
    CollaboratorOutput, Collaborators, CvParser, DownloadsSink, ProjectExtractor, Renderer,
    Storage, Summarizer,
};
use crate::pipeline::naming;

#[derive(Default)]
pub struct Calls {
    pub storage: AtomicUsize,
    pub parse: AtomicUsize,
    pub summarize: AtomicUsize,
    pub render: AtomicUsize,
    pub downloads: AtomicUsize,
}

pub fn count(c: &AtomicUsize) -> usize {
    c.load(Ordering::SeqCst)
}

/// How the fake summarizer reports its output path.
#[derive(Clone, Copy)]
pub enum Shape {
    Bare,
    Structured,
    Empty,
}

pub struct FakeOptions {
    pub storage_returns_reference: bool,
    pub parser_returns_path: bool,
    pub shape: Shape,
    pub renderer_writes_file: bool,
    pub downloads_returns_path: bool,
    pub projects: bool,
}

impl Default for FakeOptions {
    fn default() -> Self {
        Self {
            storage_returns_reference: true,
            parser_returns_path: true,
            shape: Shape::Bare,
            renderer_writes_file: true,
            downloads_returns_path: true,
            projects: false,
        }
    }
}

/// Fake collaborators writing into `<root>/parsed_jsons` and `<root>/outputs`.
pub fn fake_collaborators(root: &Path, opts: FakeOptions) -> (Collaborators, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let collaborators = Collaborators {
        storage: Arc::new(FakeStorage {
            calls: calls.clone(),
            returns_reference: opts.storage_returns_reference,
        }),
        parser: Arc::new(FakeParser {
            calls: calls.clone(),
            dir: root.join("parsed_jsons"),
            returns_path: opts.parser_returns_path,
        }),
        summarizer: Arc::new(FakeSummarizer {
            calls: calls.clone(),
            shape: opts.shape,
        }),
        locations: Arc::new(RegionClassifier::new()),
        projects: opts
            .projects
            .then(|| Arc::new(FakeProjects) as Arc<dyn ProjectExtractor>),
        renderer: Arc::new(FakeRenderer {
            calls: calls.clone(),
            dir: root.join("outputs"),
            writes_file: opts.renderer_writes_file,
        }),
        downloads: Arc::new(FakeDownloads {
            calls: calls.clone(),
            returns_path: opts.downloads_returns_path,
        }),
    };
    (collaborators, calls)
}

struct FakeStorage {
    calls: Arc<Calls>,
    returns_reference: bool,
}

#[async_trait]
impl Storage for FakeStorage {
    async fn upload(&self, local_path: &Path, destination_name: &str) -> Result<Option<String>> {
        self.calls.storage.fetch_add(1, Ordering::SeqCst);
        anyhow::ensure!(local_path.exists(), "temp copy missing");
        Ok(self
            .returns_reference
            .then(|| format!("mem://uploads/{destination_name}")))
    }
}

struct FakeParser {
    calls: Arc<Calls>,
    dir: PathBuf,
    returns_path: bool,
}

#[async_trait]
impl CvParser for FakeParser {
    async fn parse(&self, _reference: &str, base_name: &str) -> Result<Option<CollaboratorOutput>> {
        self.calls.parse.fetch_add(1, Ordering::SeqCst);
        if !self.returns_path {
            return Ok(None);
        }
        let out = self.dir.join(format!("{base_name}.json"));
        let doc = json!({
            "name": base_name,
            "experience": [
                {"company": "Xero", "title": "Developer", "location": "Wellington"},
                {"company": "Canva", "title": "Engineer", "location": "Sydney, Australia"}
            ]
        });
        std::fs::write(&out, serde_json::to_vec(&doc)?)?;
        Ok(Some(CollaboratorOutput::from(out)))
    }
}

struct FakeSummarizer {
    calls: Arc<Calls>,
    shape: Shape,
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, parsed: &Path) -> Result<Option<CollaboratorOutput>> {
        self.calls.summarize.fetch_add(1, Ordering::SeqCst);
        let mut doc: Value = serde_json::from_slice(&std::fs::read(parsed)?)?;
        doc["blurb"] = json!("A capable engineer.");
        let stem = naming::base_name(parsed);
        let out = parsed
            .with_file_name(format!("{stem}_summary.json"))
            .display()
            .to_string();
        std::fs::write(&out, serde_json::to_vec(&doc)?)?;
        Ok(Some(match self.shape {
            Shape::Bare => CollaboratorOutput::Path(out),
            Shape::Structured => CollaboratorOutput::Structured { path: Some(out) },
            Shape::Empty => CollaboratorOutput::Structured {
                path: Some(String::new()),
            },
        }))
    }
}

struct FakeRenderer {
    calls: Arc<Calls>,
    dir: PathBuf,
    writes_file: bool,
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(&self, enriched: &Path) -> Result<Option<PathBuf>> {
        self.calls.render.fetch_add(1, Ordering::SeqCst);
        let base = naming::base_from_artifact(&naming::base_name(enriched));
        let out = self.dir.join(naming::processed_file_name(&base));
        if self.writes_file {
            std::fs::write(&out, b"docx")?;
        }
        Ok(Some(out))
    }
}

struct FakeDownloads {
    calls: Arc<Calls>,
    returns_path: bool,
}

#[async_trait]
impl DownloadsSink for FakeDownloads {
    async fn save_to_downloads(&self, output: &Path) -> Result<Option<PathBuf>> {
        self.calls.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.returns_path.then(|| output.to_path_buf()))
    }
}

struct FakeProjects;

#[async_trait]
impl ProjectExtractor for FakeProjects {
    async fn extract(&self, mut doc: Value) -> Result<Value> {
        doc[PROJECTS_FIELD] = json!([{"name": "Payments API"}]);
        Ok(doc)
    }
}
