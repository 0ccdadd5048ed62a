use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logical federation of services. Upserted on first push.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A named schema producer belonging to a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
}

/// One immutable snapshot of a service's schema document.
///
/// `uid` is a UUIDv7 string: assigned once at creation, never reused, and
/// lexicographic order matches creation order. `updated_at` stays `None`
/// until the record is first mutated (deactivation or reactivation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaVersion {
    pub uid: String,
    pub graph_name: String,
    pub service_name: String,
    pub version: String,
    pub is_active: bool,
    pub hash: String,
    /// Positive integer handle, monotonic per graph.
    pub schema_id: i64,
    pub type_defs: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Lightweight projection of a version, stored per graph as an ordered
/// list, newest first by `uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIndexEntry {
    pub uid: String,
    pub service_name: String,
    pub graph_name: String,
    pub hash: String,
}

impl From<&SchemaVersion> for SchemaIndexEntry {
    fn from(v: &SchemaVersion) -> Self {
        Self {
            uid: v.uid.clone(),
            service_name: v.service_name.clone(),
            graph_name: v.graph_name.clone(),
            hash: v.hash.clone(),
        }
    }
}
