use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::compose::compose_latest;
use crate::server::AppState;
use crate::server::dto::{ComposedSchemaRow, GraphQuery};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::validate_graph_name;

/// Composes all active fragments of a graph and returns the per-service
/// version rows that built the unified schema.
pub async fn get_composed_schema(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphQuery>,
) -> impl IntoResponse {
    let graph_name = params.graph_name.ok_or_else(|| {
        ApiError::bad_request("querystring should have required property 'graph_name'")
    })?;
    validate_graph_name(&graph_name)?;

    let composed = compose_latest(&state.store, &graph_name)?;
    let rows: Vec<ComposedSchemaRow> = composed.versions.iter().map(Into::into).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(rows)))
}
