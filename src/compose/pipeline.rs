use crate::error::{Error, Result};
use crate::registry::SchemaStore;
use crate::types::SchemaVersion;

use super::{ServiceFragment, UnifiedSchema, compose};

/// The composed schema for a graph plus the per-service version metadata
/// used to build it.
#[derive(Debug, Clone)]
pub struct ComposedSchema {
    pub schema: UnifiedSchema,
    pub versions: Vec<SchemaVersion>,
}

/// Resolves every service's active version for a graph and composes them.
///
/// No partial composition: a service with no active version aborts the whole
/// operation. A graph with no services at all yields an empty success.
pub fn compose_latest(store: &SchemaStore, graph_name: &str) -> Result<ComposedSchema> {
    let graph = store
        .get_graph(graph_name)?
        .ok_or_else(|| Error::InvalidGraphName(graph_name.to_string()))?;
    if !graph.is_active {
        return Err(Error::InvalidGraphName(graph_name.to_string()));
    }

    let services = store.list_services(graph_name)?;
    if services.is_empty() {
        return Ok(ComposedSchema {
            schema: UnifiedSchema::empty(),
            versions: Vec::new(),
        });
    }

    let mut versions = Vec::with_capacity(services.len());
    for service in &services {
        let version = store
            .find_active(graph_name, &service.name)?
            .ok_or_else(|| Error::VersionLookup(service.name.clone()))?;
        versions.push(version);
    }

    let fragments: Vec<ServiceFragment> = versions
        .iter()
        .map(|v| ServiceFragment {
            service_name: v.service_name.clone(),
            type_defs: v.type_defs.clone(),
        })
        .collect();

    let schema = compose(&fragments).map_err(Error::Composition)?;

    Ok(ComposedSchema { schema, versions })
}
