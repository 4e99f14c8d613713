use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use super::DownloadsSink;

/// Copies finished documents into a local downloads directory.
#[derive(Debug, Clone)]
pub struct LocalDownloadsSink {
    dir: PathBuf,
}

impl LocalDownloadsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadsSink for LocalDownloadsSink {
    async fn save_to_downloads(&self, output_path: &Path) -> Result<Option<PathBuf>> {
        let Some(file_name) = output_path.file_name() else {
            return Ok(None);
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let target = self.dir.join(file_name);
        tokio::fs::copy(output_path, &target)
            .await
            .with_context(|| format!("copying {} to downloads", output_path.display()))?;

        info!("Saved document to {}", target.display());
        Ok(Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copies_into_downloads_dir() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("cv_processed.docx");
        std::fs::write(&source, b"docx").unwrap();

        let sink = LocalDownloadsSink::new(dir.path().join("Downloads"));
        let saved = sink.save_to_downloads(&source).await.unwrap().unwrap();

        assert_eq!(saved, dir.path().join("Downloads/cv_processed.docx"));
        assert_eq!(std::fs::read(saved).unwrap(), b"docx");
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalDownloadsSink::new(dir.path());
        assert!(sink
            .save_to_downloads(&dir.path().join("nope.docx"))
            .await
            .is_err());
    }
}
