//! HTTP handlers for instance management, batch queries and health checks.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use keygrid_gateway_http::GatewaySettings;
use keygrid_query::{run_batch, BatchItem, QueryData, QueryError, Series, Table};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::ApiError;
use crate::registry::InstanceRegistry;

/// Incoming batch envelope.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub queries: Vec<BatchItem>,
}

/// Wire form of one query's outcome.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryResponse {
    Series(Vec<Series>),
    Table(Table),
    Error(String),
}

impl From<Result<QueryData, QueryError>> for QueryResponse {
    fn from(result: Result<QueryData, QueryError>) -> Self {
        match result {
            Ok(QueryData::Series(series)) => QueryResponse::Series(series),
            Ok(QueryData::Table(table)) => QueryResponse::Table(table),
            Err(error) => QueryResponse::Error(error.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponseBody {
    pub results: HashMap<String, QueryResponse>,
}

/// Health payload for the host's check surface.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: String,
}

pub fn router(registry: Arc<InstanceRegistry>) -> Router {
    Router::new()
        .route(
            "/api/instances/{uid}",
            put(upsert_instance).delete(remove_instance),
        )
        .route("/api/instances/{uid}/query", post(run_queries))
        .route("/api/instances/{uid}/health", get(health))
        .with_state(registry)
}

/// Register or update a store instance.
async fn upsert_instance(
    State(registry): State<Arc<InstanceRegistry>>,
    Path(uid): Path<String>,
    Json(settings): Json<GatewaySettings>,
) -> Result<StatusCode, ApiError> {
    registry
        .upsert(&uid, settings)
        .await
        .map_err(|e| ApiError::InvalidSettings(e.to_string()))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_instance(
    State(registry): State<Arc<InstanceRegistry>>,
    Path(uid): Path<String>,
) -> Result<StatusCode, ApiError> {
    if registry.remove(&uid).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::UnknownInstance(uid))
    }
}

/// Evaluate a batch of panel queries against one instance.
async fn run_queries(
    State(registry): State<Arc<InstanceRegistry>>,
    Path(uid): Path<String>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponseBody>, ApiError> {
    let gateway = registry
        .gateway(&uid)
        .await
        .ok_or_else(|| ApiError::UnknownInstance(uid.clone()))?;

    debug!(uid = %uid, queries = request.queries.len(), "running batch");

    let cancel = CancellationToken::new();
    let results = run_batch(gateway.as_ref(), &request.queries, &cancel).await?;

    let results = results
        .into_iter()
        .map(|(ref_id, result)| (ref_id, QueryResponse::from(result)))
        .collect();

    Ok(Json(QueryResponseBody { results }))
}

/// Probe the instance's store and report ok/error with a message.
async fn health(
    State(registry): State<Arc<InstanceRegistry>>,
    Path(uid): Path<String>,
) -> Result<Json<HealthResponse>, ApiError> {
    let gateway = registry
        .gateway(&uid)
        .await
        .ok_or_else(|| ApiError::UnknownInstance(uid.clone()))?;

    let response = match gateway.probe().await {
        Ok(()) => HealthResponse {
            status: "ok",
            message: "data source is working".to_string(),
        },
        Err(e) => {
            error!(uid = %uid, error = %e, "health check failed");
            HealthResponse {
                status: "error",
                message: format!("store health check failed: {}", e),
            }
        }
    };
    Ok(Json(response))
}
