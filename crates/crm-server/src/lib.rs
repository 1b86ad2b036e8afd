//! crm-server: HTTP surface of the CRM graph service.
//!
//! Thin axum handlers over [`EntityService`] and [`QueryDispatcher`]; all
//! behaviour lives in `crm-service`. Every failure is rendered as an
//! [`HttpError`] JSON body.

mod http_error;
mod routes;
mod seed;

use std::sync::Arc;

use axum::{body::Body, http::Request, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crm_service::{EntityService, QueryDispatcher};

pub use http_error::HttpError;
pub use seed::seed_from_file;

/// Shared handler state. Cloned per request; everything inside is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub entities: EntityService,
    pub dispatcher: Arc<QueryDispatcher>,
}

impl AppState {
    pub fn new(entities: EntityService, dispatcher: QueryDispatcher) -> Self {
        Self {
            entities,
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Build the router with request tracing.
pub fn create_router(state: AppState) -> Router {
    routes::routes(state).layer(TraceLayer::new_for_http().make_span_with(
        |request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                request_id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        },
    ))
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "CRM server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("CRM server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
