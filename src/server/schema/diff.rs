use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::diff::diff;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::DiffSchemaRequest;
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{
    require, validate_graph_name, validate_service_name, validate_type_defs,
};

/// Diffs a candidate document against the service's currently active
/// version.
pub async fn diff_schema(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiffSchemaRequest>,
) -> impl IntoResponse {
    let graph_name = require(req.graph_name, "graph_name")?;
    let service_name = require(req.service_name, "service_name")?;
    let type_defs = require(req.type_defs, "type_defs")?;

    validate_graph_name(&graph_name)?;
    validate_service_name(&service_name)?;
    validate_type_defs(&type_defs)?;

    let active = state
        .store
        .find_active(&graph_name, &service_name)?
        .ok_or_else(|| ApiError::from(Error::VersionLookup(service_name.clone())))?;

    let changes = diff(&active.type_defs, &type_defs).map_err(ApiError::from)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(changes)))
}
