mod diff;
mod latest;
mod push;
mod versions;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::server::AppState;

pub fn schema_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/schema/push", post(push::push_schema))
        .route("/schema/diff", post(diff::diff_schema))
        .route("/schema/latest", get(latest::get_composed_schema))
        .route("/schema/versions", get(versions::list_versions))
        .route("/schema/deactivate", post(versions::deactivate_schema))
        .route("/schema/{graph_name}/{uid}", delete(versions::remove_schema))
}
