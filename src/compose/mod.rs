mod merge;
mod pipeline;

pub use merge::compose;
pub use pipeline::{ComposedSchema, compose_latest};

use serde::Serialize;
use thiserror::Error;

/// One service's schema document considered as an input to composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFragment {
    pub service_name: String,
    pub type_defs: String,
}

/// The merged, validated schema representing an entire graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedSchema {
    pub sdl: String,
}

impl UnifiedSchema {
    /// Zero fragments compose to an empty-but-valid schema, not an error.
    #[must_use]
    pub fn empty() -> Self {
        Self { sdl: String::new() }
    }
}

/// A typed composition failure. Composition never returns a partial schema:
/// callers get either a complete `UnifiedSchema` or a non-empty error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    #[error("failed to parse schema for service '{service}': {message}")]
    Parse { service: String, message: String },

    #[error("unknown type '{type_name}' referenced by '{referenced_by}'")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },

    #[error("type '{type_name}' is extended but never defined")]
    ExtensionWithoutBase { type_name: String },

    #[error("conflicting definitions for type '{type_name}'")]
    TypeConflict { type_name: String },

    #[error("conflicting definitions for field '{type_name}.{field_name}'")]
    FieldConflict {
        type_name: String,
        field_name: String,
    },
}
