//! CLI entry point for the CRM graph REST server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use crm_core::config::AppConfig;
use crm_graph::{EntityStore, GraphClient, GraphConfig, MemoryStore};
use crm_server::AppState;
use crm_service::{classifier, EntityService, QueryDispatcher};

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser)]
#[command(name = "crm-server")]
#[command(about = "REST API over the CRM knowledge graph")]
struct Cli {
    /// Config file prefix (default: crm).
    #[arg(short, long, default_value = "crm")]
    config: String,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep data in process memory instead of Neo4j.
    #[arg(long)]
    in_memory: bool,

    /// Create the uniqueness constraints before serving.
    #[arg(long)]
    init_schema: bool,

    /// Bulk-load customers, opportunities and interactions from a JSON file.
    #[arg(long, value_name = "PATH")]
    seed: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "json")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match cli.log_format {
        LogFormat::Json => fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => fmt().with_env_filter(filter).pretty().init(),
    }

    let config = AppConfig::load(&cli.config)?;

    let store: Arc<dyn EntityStore> = if cli.in_memory {
        tracing::warn!("Running with the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(GraphClient::connect(&GraphConfig::from(&config.neo4j)).await?)
    };

    let entities = EntityService::new(store);
    if cli.init_schema {
        entities.initialize_schema().await?;
    }
    if let Some(path) = &cli.seed {
        crm_server::seed_from_file(&entities, path).await?;
    }

    let classifier = classifier::from_settings(&config.classifier)?;
    tracing::info!(backend = ?config.classifier.backend, "Classifier ready");
    let dispatcher = QueryDispatcher::new(classifier, entities.clone());

    let host = cli.host.unwrap_or(config.server.host);
    let port = cli.port.unwrap_or(config.server.port);
    let listener = TcpListener::bind((host.as_str(), port)).await?;

    crm_server::serve(listener, AppState::new(entities, dispatcher)).await
}
