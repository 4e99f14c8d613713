use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use super::{CollaboratorOutput, Summarizer};
use crate::llm_client::prompts::{BLURB_PROMPT, BLURB_SYSTEM};
use crate::llm_client::LlmClient;

pub const BLURB_FIELD: &str = "blurb";

/// Adds an LLM-written profile blurb to the parsed CV and writes the result
/// next to the input as `<stem>_summary.json`.
#[derive(Clone)]
pub struct ClaudeSummarizer {
    llm: LlmClient,
}

impl ClaudeSummarizer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Summarizer for ClaudeSummarizer {
    async fn summarize(&self, parsed_json_path: &Path) -> Result<Option<CollaboratorOutput>> {
        let raw = tokio::fs::read_to_string(parsed_json_path)
            .await
            .with_context(|| format!("reading {}", parsed_json_path.display()))?;
        let mut doc: Value = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not valid JSON", parsed_json_path.display()))?;

        let prompt = BLURB_PROMPT.replace("{cv_json}", &serde_json::to_string_pretty(&doc)?);
        let blurb = self
            .llm
            .complete(&prompt, BLURB_SYSTEM)
            .await
            .context("blurb generation failed")?;

        let Some(obj) = doc.as_object_mut() else {
            anyhow::bail!("parsed CV is not a JSON object");
        };
        obj.insert(BLURB_FIELD.to_string(), Value::String(blurb));

        let out = summary_path(parsed_json_path);
        tokio::fs::write(&out, serde_json::to_vec_pretty(&doc)?)
            .await
            .with_context(|| format!("writing {}", out.display()))?;

        info!("Blurb added, summary saved to {}", out.display());
        Ok(Some(CollaboratorOutput::from(out)))
    }
}

fn summary_path(parsed: &Path) -> PathBuf {
    let stem = parsed
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("parsed");
    parsed.with_file_name(format!("{stem}_summary.json"))
}
