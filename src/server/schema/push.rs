use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::PushSchemaRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{
    require, validate_graph_name, validate_service_name, validate_type_defs, validate_version,
};

/// Registers a new active schema version for a service, deactivating the
/// prior one. Pushing a document identical to an already-stored version for
/// the same (graph, service) returns the existing record.
pub async fn push_schema(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PushSchemaRequest>,
) -> impl IntoResponse {
    let graph_name = require(req.graph_name, "graph_name")?;
    let service_name = require(req.service_name, "service_name")?;
    let type_defs = require(req.type_defs, "type_defs")?;
    let version = require(req.version, "version")?;

    validate_graph_name(&graph_name)?;
    validate_service_name(&service_name)?;
    validate_version(&version)?;
    validate_type_defs(&type_defs)?;

    let pushed = state
        .store
        .push(&graph_name, &service_name, &version, &type_defs)?;

    tracing::info!(
        "schema pushed: graph={} service={} uid={}",
        graph_name,
        service_name,
        pushed.uid
    );

    Ok::<_, ApiError>(Json(ApiResponse::success(pushed)))
}
