//! Configuration management for the CRM service.
//!
//! Configuration is loaded from (in priority order):
//! 1. `NEO4J_URI`, `NEO4J_USER`, `NEO4J_PASSWORD` environment variables
//! 2. Environment variables (`CRM__` prefix, `__` separator, e.g. `CRM__SERVER__PORT`)
//! 3. Config file (`crm.toml`, prefix selectable)
//! 4. Defaults

use serde::Deserialize;

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub neo4j: Neo4jSettings,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub classifier: ClassifierSettings,
}

/// Neo4j connection settings (`[neo4j]` section).
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jSettings {
    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Upper bound of pooled bolt connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
}

/// HTTP listener settings (`[server]` section).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Which zero-shot classifier answers `/query/`.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Remote inference endpoint.
    #[default]
    Http,
    /// Local keyword rules, no network access.
    Keyword,
}

/// Zero-shot classifier settings (`[classifier]` section).
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSettings {
    #[serde(default)]
    pub backend: ClassifierBackend,

    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    /// Bearer token sent to the inference endpoint, if it needs one.
    #[serde(default)]
    pub api_token: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from `<file_prefix>.{toml,yaml,json}` and the environment.
    pub fn load(file_prefix: &str) -> anyhow::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("CRM")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("neo4j.uri", std::env::var("NEO4J_URI").ok())?
            .set_override_option("neo4j.user", std::env::var("NEO4J_USER").ok())?
            .set_override_option("neo4j.password", std::env::var("NEO4J_PASSWORD").ok())?
            .build()?;

        let app: AppConfig = cfg.try_deserialize()?;
        tracing::debug!(
            uri = %app.neo4j.uri,
            port = app.server.port,
            classifier = ?app.classifier.backend,
            "Configuration loaded"
        );
        Ok(app)
    }
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_classifier_endpoint() -> String {
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Neo4jSettings {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            endpoint: default_classifier_endpoint(),
            api_token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}
