//! File Tracker: append-only audit log of every artifact a pipeline run
//! produces.
//!
//! `track` never fails from the caller's point of view: any problem is
//! logged and swallowed so auditing can never abort a run.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("tracker lock poisoned")]
    Poisoned,

    #[error("journal write failed: {0}")]
    Journal(#[from] std::io::Error),

    #[error("record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One audit entry. Never updated or deleted once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactRecord {
    /// Base name of the run that produced the artifact.
    pub run: String,
    pub path: String,
    pub stage: String,
    pub status: String,
    pub note: String,
    pub timestamp: DateTime<Utc>,
}

/// Shared across all runs; internally synchronized.
#[derive(Debug, Default)]
pub struct FileTracker {
    records: Mutex<Vec<ArtifactRecord>>,
    journal: Option<PathBuf>,
}

impl FileTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also mirrors every record as one JSON line into `journal`.
    pub fn with_journal(journal: impl Into<PathBuf>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            journal: Some(journal.into()),
        }
    }

    /// Records one artifact and returns the stored record.
    pub fn track(
        &self,
        run: &str,
        path: impl AsRef<Path>,
        stage: &str,
        status: &str,
        note: &str,
    ) -> ArtifactRecord {
        let record = ArtifactRecord {
            run: run.to_string(),
            path: path.as_ref().display().to_string(),
            stage: stage.to_string(),
            status: status.to_string(),
            note: note.to_string(),
            timestamp: Utc::now(),
        };

        if let Err(e) = self.append(&record) {
            warn!(
                run = %record.run,
                stage = %record.stage,
                "File tracking failed: {e}"
            );
        }

        record
    }

    /// Every record in insertion order. Diagnostics only.
    pub fn summarize(&self) -> Vec<ArtifactRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(_) => {
                warn!("File tracker lock poisoned; summary unavailable");
                Vec::new()
            }
        }
    }

    /// Records belonging to a single run.
    pub fn records_for(&self, run: &str) -> Vec<ArtifactRecord> {
        self.summarize()
            .into_iter()
            .filter(|r| r.run == run)
            .collect()
    }

    /// Writes the current summary to the process log.
    pub fn log_summary(&self) {
        let records = self.summarize();
        info!("File tracker summary: {} artifact(s)", records.len());
        for r in &records {
            info!(
                "  [{}] {} {} -> {} ({})",
                r.run, r.stage, r.status, r.path, r.note
            );
        }
    }

    /// The guard is held through the journal write so concurrent runs never
    /// interleave their lines.
    fn append(&self, record: &ArtifactRecord) -> Result<(), TrackingError> {
        let mut records = self.records.lock().map_err(|_| TrackingError::Poisoned)?;
        records.push(record.clone());

        if let Some(journal) = &self.journal {
            let mut line = serde_json::to_string(record)?;
            line.push('\n');
            let mut file = OpenOptions::new().create(true).append(true).open(journal)?;
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }
}
