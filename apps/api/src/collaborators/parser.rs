use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{CollaboratorOutput, CvParser};

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    url: &'a str,
}

/// Client for the third-party CV parsing API. The API fetches the file from
/// the storage reference and answers with the structured CV, which is
/// written to `<parsed_dir>/<base_name>.json`.
#[derive(Clone)]
pub struct HttpCvParser {
    client: Client,
    endpoint: String,
    api_key: String,
    parsed_dir: PathBuf,
}

impl HttpCvParser {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        parsed_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            parsed_dir: parsed_dir.into(),
        }
    }
}

#[async_trait]
impl CvParser for HttpCvParser {
    async fn parse(
        &self,
        storage_reference: &str,
        base_name: &str,
    ) -> Result<Option<CollaboratorOutput>> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ParseRequest {
                url: storage_reference,
            })
            .send()
            .await
            .context("CV parser request failed")?
            .error_for_status()
            .context("CV parser rejected the request")?;

        let parsed: Value = response
            .json()
            .await
            .context("CV parser returned invalid JSON")?;
        if parsed.is_null() {
            return Ok(None);
        }
        let parsed = unwrap_data(parsed);

        let out = self.parsed_dir.join(format!("{base_name}.json"));
        tokio::fs::write(&out, serde_json::to_vec_pretty(&parsed)?)
            .await
            .with_context(|| format!("writing {}", out.display()))?;

        info!("Parsed CV saved to {}", out.display());
        Ok(Some(CollaboratorOutput::from(out)))
    }
}

/// Some parser plans wrap the CV in a `data` envelope.
fn unwrap_data(parsed: Value) -> Value {
    match parsed {
        Value::Object(mut obj) if obj.len() == 1 && obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data_envelope() {
        assert_eq!(
            unwrap_data(json!({"data": {"name": "Jane"}})),
            json!({"name": "Jane"})
        );
        assert_eq!(
            unwrap_data(json!({"data": 1, "meta": 2})),
            json!({"data": 1, "meta": 2})
        );
    }
}
