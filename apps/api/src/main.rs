mod collaborators;
mod config;
mod errors;
mod formatting;
mod llm_client;
mod pipeline;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::collaborators::downloads::LocalDownloadsSink;
use crate::collaborators::location::RegionClassifier;
use crate::collaborators::parser::HttpCvParser;
use crate::collaborators::projects::LlmProjectExtractor;
use crate::collaborators::renderer::DocxRenderer;
use crate::collaborators::storage::S3Storage;
use crate::collaborators::summarizer::ClaudeSummarizer;
use crate::collaborators::{Collaborators, ProjectExtractor};
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pipeline::orchestrator::Orchestrator;
use crate::pipeline::tracker::FileTracker;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV pipeline v{}", env!("CARGO_PKG_VERSION"));

    for dir in config.working_dirs() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let tracker = Arc::new(match &config.tracker_journal {
        Some(journal) => {
            info!("File tracker journal: {}", journal.display());
            FileTracker::with_journal(journal)
        }
        None => FileTracker::new(),
    });

    let collaborators = build_collaborators(&config).await?;
    let orchestrator = Arc::new(Orchestrator::new(
        collaborators,
        tracker.clone(),
        config.parsed_dir.clone(),
    ));
    info!(
        "Pipeline stages: {}",
        orchestrator
            .stages()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    let state = AppState {
        config: config.clone(),
        orchestrator,
        tracker: tracker.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracker.log_summary();
    Ok(())
}

/// Production collaborators, each constructed once and shared by every run.
async fn build_collaborators(config: &Config) -> Result<Collaborators> {
    let storage = S3Storage::from_config(config).await;
    info!("S3 storage initialized (bucket: {})", config.s3_bucket);

    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let projects = config.enable_project_extraction.then(|| {
        info!("Project extraction enabled");
        Arc::new(LlmProjectExtractor::new(llm.clone())) as Arc<dyn ProjectExtractor>
    });

    if !config.template_path.exists() {
        tracing::warn!(
            "Template {} not found; rendering will fail until it is provided",
            config.template_path.display()
        );
    }

    Ok(Collaborators {
        storage: Arc::new(storage),
        parser: Arc::new(HttpCvParser::new(
            config.cv_parser_url.clone(),
            config.cv_parser_api_key.clone(),
            config.parsed_dir.clone(),
        )),
        summarizer: Arc::new(ClaudeSummarizer::new(llm)),
        locations: Arc::new(RegionClassifier::new()),
        projects,
        renderer: Arc::new(DocxRenderer::new(
            config.template_path.clone(),
            config.output_dir.clone(),
        )),
        downloads: Arc::new(LocalDownloadsSink::new(config.downloads_dir.clone())),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
