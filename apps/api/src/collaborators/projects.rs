use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::ProjectExtractor;
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PROJECTS_PROMPT};
use crate::llm_client::LlmClient;

pub const PROJECTS_FIELD: &str = "projects";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub employer: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Asks the LLM for the candidate's notable projects and stores them under
/// `projects`. Only scheduled when project extraction is enabled.
#[derive(Clone)]
pub struct LlmProjectExtractor {
    llm: LlmClient,
}

impl LlmProjectExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ProjectExtractor for LlmProjectExtractor {
    async fn extract(&self, doc: Value) -> Result<Value> {
        let prompt = PROJECTS_PROMPT.replace("{cv_json}", &serde_json::to_string_pretty(&doc)?);
        let projects: Vec<Project> = self
            .llm
            .complete_json(&prompt, JSON_ONLY_SYSTEM)
            .await
            .context("project extraction failed")?;

        info!("Extracted {} project(s)", projects.len());
        attach_projects(doc, projects)
    }
}

fn attach_projects(mut doc: Value, projects: Vec<Project>) -> Result<Value> {
    let obj = doc
        .as_object_mut()
        .context("CV document is not a JSON object")?;
    obj.insert(PROJECTS_FIELD.to_string(), serde_json::to_value(projects)?);
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_defaults_for_sparse_llm_output() {
        let project: Project = serde_json::from_value(json!({"name": "Billing rewrite"})).unwrap();
        assert_eq!(project.name, "Billing rewrite");
        assert!(project.technologies.is_empty());
        assert!(project.employer.is_none());
    }

    #[test]
    fn test_attach_projects_replaces_section() {
        let doc = json!({"name": "Jane", "projects": ["stale"]});
        let out = attach_projects(
            doc,
            vec![Project {
                name: "Payments API".into(),
                employer: Some("Xero".into()),
                description: String::new(),
                technologies: vec!["Rust".into()],
            }],
        )
        .unwrap();
        assert_eq!(out["projects"][0]["name"], "Payments API");
        assert_eq!(out["projects"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_attach_projects_rejects_non_object() {
        assert!(attach_projects(json!([1, 2]), Vec::new()).is_err());
    }
}
