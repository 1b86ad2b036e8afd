//! REST endpoints.
//!
//! - `GET    /health`
//! - `POST   /init/`
//! - `POST   /create/`
//! - `PUT    /update/:entity/:id/`
//! - `DELETE /delete/:entity/:id/`
//! - `GET    /retrieve/:entity/:id/`
//! - `POST   /query/`

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use crm_core::{
    BulkCreateReport, BulkCreateRequest, DeleteAck, EntityId, EntityKind, EntityView, QueryRequest,
    ValidationError,
};
use serde::Serialize;
use serde_json::Value;

use crate::{AppState, HttpError};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/init/", post(init_schema))
        .route("/create/", post(create_entities))
        .route("/update/:entity/:id/", put(update_entity))
        .route("/delete/:entity/:id/", delete(delete_entity))
        .route("/retrieve/:entity/:id/", get(retrieve_entity))
        .route("/query/", post(query))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub store: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub status: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Response {
    let store_ok = match state.entities.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: store unreachable");
            false
        }
    };

    let body = HealthStatus {
        status: if store_ok { "ok" } else { "degraded" },
        store: if store_ok { "ok" } else { "unreachable" },
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
    };
    let status = if store_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

async fn init_schema(State(state): State<AppState>) -> Result<Json<InitResponse>, HttpError> {
    state.entities.initialize_schema().await?;
    Ok(Json(InitResponse { status: "ok" }))
}

async fn create_entities(
    State(state): State<AppState>,
    payload: Result<Json<BulkCreateRequest>, JsonRejection>,
) -> Result<Json<BulkCreateReport>, HttpError> {
    let Json(request) = payload.map_err(malformed)?;
    Ok(Json(state.entities.create(&request).await))
}

async fn update_entity(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EntityView>, HttpError> {
    let (kind, id) = parse_target(&entity, &id)?;
    let Json(partial) = payload.map_err(malformed)?;
    Ok(Json(state.entities.update(kind, id, &partial).await?))
}

async fn delete_entity(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<DeleteAck>, HttpError> {
    let (kind, id) = parse_target(&entity, &id)?;
    Ok(Json(state.entities.delete(kind, id).await?))
}

async fn retrieve_entity(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
) -> Result<Json<EntityView>, HttpError> {
    let (kind, id) = parse_target(&entity, &id)?;
    Ok(Json(state.entities.retrieve(kind, id).await?))
}

async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<EntityView>, HttpError> {
    let Json(request) = payload.map_err(malformed)?;
    Ok(Json(state.dispatcher.dispatch(&request.query).await?))
}

fn parse_target(entity: &str, id: &str) -> Result<(EntityKind, EntityId), HttpError> {
    let kind: EntityKind = entity.parse()?;
    let id = EntityId::parse("id", id)?;
    Ok((kind, id))
}

fn malformed(rejection: JsonRejection) -> HttpError {
    ValidationError::MalformedPayload(rejection.body_text()).into()
}
