use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{DeactivateSchemaRequest, GraphQuery, RemoveSchemaResponse};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{require, validate_graph_name};

/// Returns the full version index for a graph, newest first.
pub async fn list_versions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphQuery>,
) -> impl IntoResponse {
    let graph_name = params.graph_name.ok_or_else(|| {
        ApiError::bad_request("querystring should have required property 'graph_name'")
    })?;
    validate_graph_name(&graph_name)?;

    let index = state.store.list(&graph_name)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(index)))
}

/// Clears the active flag on a version, leaving its service without an
/// active schema until the next push.
pub async fn deactivate_schema(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeactivateSchemaRequest>,
) -> impl IntoResponse {
    let graph_name = require(req.graph_name, "graph_name")?;
    let uid = require(req.uid, "uid")?;
    validate_graph_name(&graph_name)?;

    let version = state.store.deactivate(&graph_name, &uid)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(version)))
}

/// Deletes a version record and its index entry.
pub async fn remove_schema(
    State(state): State<Arc<AppState>>,
    Path((graph_name, uid)): Path<(String, String)>,
) -> impl IntoResponse {
    validate_graph_name(&graph_name)?;

    let removed = state.store.remove(&graph_name, &uid)?;
    if !removed {
        return Err(ApiError::not_found("Schema version not found"));
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(RemoveSchemaResponse { removed })))
}
