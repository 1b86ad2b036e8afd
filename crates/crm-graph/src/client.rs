//! Neo4j connection management and shared graph client.

use crm_core::config::Neo4jSettings;
use crm_core::CrmError;
use neo4rs::{ConfigBuilder, Graph, Query, Row};

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Unexpected record shape: {0}")]
    Serialization(String),
}

impl From<GraphError> for CrmError {
    fn from(err: GraphError) -> Self {
        CrmError::Store(err.to_string())
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "crm-dev".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

impl From<&Neo4jSettings> for GraphConfig {
    fn from(settings: &Neo4jSettings) -> Self {
        Self {
            uri: settings.uri.clone(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            max_connections: settings.max_connections,
            fetch_size: settings.fetch_size,
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// One instance lives for the whole process. Every call checks a connection
/// out of the pool and hands it back when the call's future finishes or is
/// dropped, so a failing statement never leaks a session and concurrent
/// requests never share one. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Open the connection pool. Fails fast if the server rejects the
    /// credentials or cannot be reached.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let pool_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(connection_error)?;

        let graph = Graph::connect(pool_config).await.map_err(connection_error)?;

        tracing::info!(
            uri = %config.uri,
            max_connections = config.max_connections,
            "Connected to Neo4j"
        );
        Ok(Self { graph })
    }

    /// Auto-commit a statement whose result rows are not needed.
    pub async fn run(&self, statement: Query) -> Result<(), GraphError> {
        self.graph.run(statement).await?;
        Ok(())
    }

    /// Collect every row a statement returns.
    pub async fn query_rows(&self, statement: Query) -> Result<Vec<Row>, GraphError> {
        let mut rows = Vec::new();
        let mut stream = self.graph.execute(statement).await?;
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// First row of a statement's result, if any.
    pub async fn query_one(&self, statement: Query) -> Result<Option<Row>, GraphError> {
        Ok(self.graph.execute(statement).await?.next().await?)
    }

    /// Round-trip a trivial statement to check the database is reachable.
    pub async fn ping(&self) -> Result<(), GraphError> {
        match self.query_one(neo4rs::query("RETURN 1 AS ok")).await? {
            Some(_) => Ok(()),
            None => Err(GraphError::Connection("empty response to ping".to_string())),
        }
    }
}

fn connection_error(err: neo4rs::Error) -> GraphError {
    GraphError::Connection(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_config_from_settings() {
        let settings = Neo4jSettings {
            uri: "bolt://db:7687".to_string(),
            user: "crm".to_string(),
            password: "secret".to_string(),
            max_connections: 4,
            fetch_size: 64,
        };
        let config = GraphConfig::from(&settings);
        assert_eq!(config.uri, "bolt://db:7687");
        assert_eq!(config.user, "crm");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.fetch_size, 64);
    }

    #[test]
    fn graph_error_becomes_store_error() {
        let err: CrmError = GraphError::Connection("refused".to_string()).into();
        assert!(matches!(err, CrmError::Store(ref msg) if msg.contains("refused")));
    }
}
