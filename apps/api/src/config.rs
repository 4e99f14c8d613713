use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub upload_dir: PathBuf,
    pub parsed_dir: PathBuf,
    pub output_dir: PathBuf,
    pub downloads_dir: PathBuf,
    pub template_path: PathBuf,
    pub max_upload_bytes: usize,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub cv_parser_url: String,
    pub cv_parser_api_key: String,
    pub enable_project_extraction: bool,
    pub tracker_journal: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
            upload_dir: optional_env("UPLOAD_DIR", "uploads").into(),
            parsed_dir: optional_env("PARSED_DIR", "parsed_jsons").into(),
            output_dir: optional_env("OUTPUT_DIR", "outputs").into(),
            downloads_dir: std::env::var("DOWNLOADS_DIR")
                .map(PathBuf::from)
                .ok()
                .or_else(dirs::download_dir)
                .unwrap_or_else(|| PathBuf::from("downloads")),
            template_path: optional_env("TEMPLATE_PATH", "templates/Current_template.docx").into(),
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: optional_env("S3_REGION", "us-east-1"),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            cv_parser_url: require_env("CV_PARSER_URL")?,
            cv_parser_api_key: require_env("CV_PARSER_API_KEY")?,
            enable_project_extraction: parse_flag(&optional_env(
                "ENABLE_PROJECT_EXTRACTION",
                "false",
            )),
            tracker_journal: std::env::var("FILE_TRACKER_JOURNAL").ok().map(PathBuf::from),
        })
    }

    /// Local directories that must exist before the first request.
    pub fn working_dirs(&self) -> [&PathBuf; 3] {
        [&self.upload_dir, &self.parsed_dir, &self.output_dir]
    }

    /// Human readable upload cap, e.g. "16MB".
    pub fn max_upload_label(&self) -> String {
        const MIB: usize = 1024 * 1024;
        format!("{}MB", self.max_upload_bytes.div_ceil(MIB))
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
impl Config {
    /// Config rooted in a scratch directory with dummy credentials.
    pub fn for_tests(root: &std::path::Path) -> Self {
        Config {
            port: 0,
            rust_log: "debug".into(),
            upload_dir: root.join("uploads"),
            parsed_dir: root.join("parsed_jsons"),
            output_dir: root.join("outputs"),
            downloads_dir: root.join("downloads"),
            template_path: root.join("template.docx"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            s3_bucket: "test".into(),
            s3_endpoint: "http://localhost:9000".into(),
            s3_region: "us-east-1".into(),
            aws_access_key_id: "test".into(),
            aws_secret_access_key: "test".into(),
            anthropic_api_key: "test".into(),
            cv_parser_url: "http://localhost:9999/parse".into(),
            cv_parser_api_key: "test".into(),
            enable_project_extraction: false,
            tracker_journal: None,
        }
    }
}
