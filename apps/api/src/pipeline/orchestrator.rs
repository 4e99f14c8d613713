//! Pipeline Orchestrator: runs the stage list for one upload.
//!
//! Flow: upload → parse → summarize → geo_enrich → [extract_projects] →
//!       persist → render
//!
//! Each stage is a method returning `Result<StageOutcome, StageError>`; a
//! single loop drives them in order and stops at the first failure. Every
//! completed stage leaves exactly one artifact record. Collaborator errors
//! are never retried here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, info_span, Instrument};

use super::error::StageError;
use super::naming;
use super::run::{PipelineOutcome, PipelineRun, StageOutcome};
use super::stage::Stage;
use super::tracker::FileTracker;
use crate::collaborators::projects::PROJECTS_FIELD;
use crate::collaborators::{CollaboratorOutput, Collaborators};

pub struct Orchestrator {
    collaborators: Collaborators,
    tracker: Arc<FileTracker>,
    parsed_dir: PathBuf,
    stages: Vec<Stage>,
}

impl Orchestrator {
    /// Project extraction is scheduled only when an extractor is supplied.
    pub fn new(
        collaborators: Collaborators,
        tracker: Arc<FileTracker>,
        parsed_dir: impl Into<PathBuf>,
    ) -> Self {
        let stages = Stage::schedule(collaborators.projects.is_some());
        Self {
            collaborators,
            tracker,
            parsed_dir: parsed_dir.into(),
            stages,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Runs the full pipeline for an uploaded file. Never returns an error:
    /// every failure is folded into a `success: false` outcome.
    pub async fn process(&self, file_path: &Path, filename: &str) -> PipelineOutcome {
        let mut run = PipelineRun::new(file_path, filename);
        let span = info_span!("pipeline", run_id = %run.id, base_name = %run.base_name);
        self.drive(&mut run).instrument(span).await
    }

    async fn drive(&self, run: &mut PipelineRun) -> PipelineOutcome {
        info!("Starting CV pipeline for: {}", run.original_filename);

        for &stage in &self.stages {
            run.current_stage = Some(stage);
            info!("Stage {stage} starting");

            match self.execute(stage, run).await {
                Ok(outcome) => {
                    let record = self.tracker.track(
                        &run.base_name,
                        &outcome.location,
                        stage.as_str(),
                        outcome.status,
                        &outcome.note,
                    );
                    run.artifacts.push(record);
                    run.locations.insert(stage, outcome.location);
                }
                Err(e) => {
                    let failed = run.current_stage.unwrap_or_else(|| e.stage());
                    error!(
                        stage = %failed,
                        "Error processing CV {} at stage {failed}: {e}",
                        run.original_filename
                    );
                    return PipelineOutcome::failure(format!("Error processing CV: {e}"));
                }
            }
        }

        let download_file = run
            .location(Stage::Render)
            .and_then(|p| Path::new(p).file_name())
            .and_then(|n| n.to_str())
            .map(String::from);

        match download_file {
            Some(file) => {
                info!(
                    "CV processing completed successfully for: {} ({} artifact(s) tracked)",
                    run.original_filename,
                    run.artifacts.len()
                );
                PipelineOutcome::completed(&run.original_filename, file)
            }
            None => {
                let e = StageError::Render("no output document recorded".to_string());
                error!("Error processing CV {}: {e}", run.original_filename);
                PipelineOutcome::failure(format!("Error processing CV: {e}"))
            }
        }
    }

    async fn execute(&self, stage: Stage, run: &mut PipelineRun) -> Result<StageOutcome, StageError> {
        match stage {
            Stage::Upload => self.upload(run).await,
            Stage::Parse => self.parse(run).await,
            Stage::Summarize => self.summarize(run).await,
            Stage::GeoEnrich => self.geo_enrich(run).await,
            Stage::ExtractProjects => self.extract_projects(run).await,
            Stage::Persist => self.persist(run).await,
            Stage::Render => self.render(run).await,
        }
    }

    // ────────────────────────────────────────────────────────────────────────
    // Stages
    // ────────────────────────────────────────────────────────────────────────

    async fn upload(&self, run: &PipelineRun) -> Result<StageOutcome, StageError> {
        let ext = naming::extension(&run.source_path).unwrap_or_default();
        let destination = if ext.is_empty() {
            run.base_name.clone()
        } else {
            format!("{}.{ext}", run.base_name)
        };

        // Dropped (and removed) once the upload returns.
        let temp = tempfile::Builder::new()
            .prefix("cv-upload-")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .map_err(|e| StageError::Storage(format!("creating temp file: {e}")))?;
        tokio::fs::copy(&run.source_path, temp.path())
            .await
            .map_err(|e| {
                StageError::Storage(format!("copying {}: {e}", run.source_path.display()))
            })?;

        let reference = self
            .collaborators
            .storage
            .upload(temp.path(), &destination)
            .await
            .map_err(|e| StageError::Storage(format!("{e:#}")))?
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| StageError::Storage("storage returned no reference".to_string()))?;

        Ok(StageOutcome::new(
            reference,
            "uploaded",
            format!("File uploaded to storage as {destination}"),
        ))
    }

    async fn parse(&self, run: &PipelineRun) -> Result<StageOutcome, StageError> {
        let reference = required(run, Stage::Upload, Stage::Parse)?;
        let output = self
            .collaborators
            .parser
            .parse(reference, &run.base_name)
            .await
            .map_err(|e| StageError::Parse(format!("{e:#}")))?;
        let path = unwrap_path(output, Stage::Parse, "parser returned no path")?;

        Ok(StageOutcome::new(path, "parsed", "CV parsed to JSON"))
    }

    async fn summarize(&self, run: &PipelineRun) -> Result<StageOutcome, StageError> {
        let parsed = required(run, Stage::Parse, Stage::Summarize)?;
        let output = self
            .collaborators
            .summarizer
            .summarize(Path::new(parsed))
            .await
            .map_err(|e| StageError::Summarize(format!("{e:#}")))?;
        let path = unwrap_path(output, Stage::Summarize, "summarizer returned an empty path")?;

        Ok(StageOutcome::new(
            path,
            "generated",
            "Blurb generated and added to JSON",
        ))
    }

    async fn geo_enrich(&self, run: &mut PipelineRun) -> Result<StageOutcome, StageError> {
        let summarized = required(run, Stage::Summarize, Stage::GeoEnrich)?.to_string();
        let raw = tokio::fs::read_to_string(&summarized)
            .await
            .map_err(|e| StageError::Geo(format!("reading {summarized}: {e}")))?;
        let doc: Value = serde_json::from_str(&raw)
            .map_err(|e| StageError::Geo(format!("{summarized} is not valid JSON: {e}")))?;

        run.document = Some(self.collaborators.locations.enrich(doc));

        Ok(StageOutcome::new(
            summarized,
            "classified",
            "Experience locations classified",
        ))
    }

    async fn extract_projects(&self, run: &mut PipelineRun) -> Result<StageOutcome, StageError> {
        let extractor = self
            .collaborators
            .projects
            .as_ref()
            .ok_or_else(|| StageError::Projects("no project extractor configured".to_string()))?;
        let doc = run
            .document
            .take()
            .ok_or_else(|| StageError::Projects("no enriched document in memory".to_string()))?;

        let doc = extractor
            .extract(doc)
            .await
            .map_err(|e| StageError::Projects(format!("{e:#}")))?;
        let count = doc
            .get(PROJECTS_FIELD)
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        run.document = Some(doc);

        let source = run.location(Stage::GeoEnrich).unwrap_or_default().to_string();
        Ok(StageOutcome::new(
            source,
            "extracted",
            format!("{count} project(s) added"),
        ))
    }

    async fn persist(&self, run: &PipelineRun) -> Result<StageOutcome, StageError> {
        let doc = run
            .document
            .as_ref()
            .ok_or_else(|| StageError::Persist("no enriched document in memory".to_string()))?;
        let path = naming::enriched_json_path(&self.parsed_dir, &run.base_name);
        let bytes = serde_json::to_vec_pretty(doc)
            .map_err(|e| StageError::Persist(format!("serializing: {e}")))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StageError::Persist(format!("writing {}: {e}", path.display())))?;

        Ok(StageOutcome::new(
            path.display().to_string(),
            "saved",
            "Enriched JSON saved",
        ))
    }

    async fn render(&self, run: &PipelineRun) -> Result<StageOutcome, StageError> {
        let enriched = required(run, Stage::Persist, Stage::Render)?;
        let output = self
            .collaborators
            .renderer
            .render(Path::new(enriched))
            .await
            .map_err(|e| StageError::Render(format!("{e:#}")))?
            .ok_or_else(|| StageError::Render("renderer returned no document".to_string()))?;

        match tokio::fs::try_exists(&output).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(StageError::Render(format!(
                    "generated file not found at {}",
                    output.display()
                )))
            }
            Err(e) => {
                return Err(StageError::Render(format!(
                    "checking {}: {e}",
                    output.display()
                )))
            }
        }

        let download = self
            .collaborators
            .downloads
            .save_to_downloads(&output)
            .await
            .map_err(|e| StageError::Render(format!("{e:#}")))?
            .ok_or_else(|| {
                StageError::Render("failed to save file to downloads folder".to_string())
            })?;

        Ok(StageOutcome::new(
            output.display().to_string(),
            "rendered",
            format!("Document generated, copy saved to {}", download.display()),
        ))
    }
}

/// Location left by `producer`, required by `consumer`.
fn required(run: &PipelineRun, producer: Stage, consumer: Stage) -> Result<&str, StageError> {
    run.location(producer)
        .ok_or_else(|| StageError::at(consumer, format!("missing output of stage {producer}")))
}

fn unwrap_path(
    output: Option<CollaboratorOutput>,
    stage: Stage,
    reason: &str,
) -> Result<String, StageError> {
    output
        .and_then(CollaboratorOutput::into_path)
        .map(|p| p.display().to_string())
        .ok_or_else(|| StageError::at(stage, reason))
}
