use serde::{Deserialize, Serialize};

use crate::types::SchemaVersion;

// Required fields are modeled as Options and checked in the handlers so a
// missing property produces the envelope-shaped 400, not an extractor
// rejection.

#[derive(Debug, Deserialize)]
pub struct PushSchemaRequest {
    #[serde(default)]
    pub graph_name: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub type_defs: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DiffSchemaRequest {
    #[serde(default)]
    pub graph_name: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub type_defs: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateSchemaRequest {
    #[serde(default)]
    pub graph_name: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    #[serde(default)]
    pub graph_name: Option<String>,
}

/// One row of the composed-schema response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedSchemaRow {
    pub version: String,
    pub type_defs: String,
    pub service_name: String,
    pub schema_id: i64,
}

impl From<&SchemaVersion> for ComposedSchemaRow {
    fn from(v: &SchemaVersion) -> Self {
        Self {
            version: v.version.clone(),
            type_defs: v.type_defs.clone(),
            service_name: v.service_name.clone(),
            schema_id: v.schema_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemoveSchemaResponse {
    pub removed: bool,
}
