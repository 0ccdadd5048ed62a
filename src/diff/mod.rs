mod engine;

pub use engine::diff;

use serde::Serialize;

/// Consumer impact of a structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriticalityLevel {
    Breaking,
    Dangerous,
    NonBreaking,
}

/// Classification of a change. `reason` is populated only for BREAKING and
/// DANGEROUS changes and explains the consumer impact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Criticality {
    pub level: CriticalityLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Criticality {
    pub(crate) fn breaking(reason: impl Into<String>) -> Self {
        Self {
            level: CriticalityLevel::Breaking,
            reason: Some(reason.into()),
        }
    }

    pub(crate) fn dangerous(reason: impl Into<String>) -> Self {
        Self {
            level: CriticalityLevel::Dangerous,
            reason: Some(reason.into()),
        }
    }

    pub(crate) fn non_breaking() -> Self {
        Self {
            level: CriticalityLevel::NonBreaking,
            reason: None,
        }
    }
}

/// Structural edit tag. Serialized with the wire names consumers match on
/// (`FIELD_ADDED`, `TYPE_REMOVED`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    TypeAdded,
    TypeRemoved,
    TypeKindChanged,
    FieldAdded,
    FieldRemoved,
    FieldTypeChanged,
    FieldArgumentAdded,
    FieldArgumentRemoved,
    FieldArgumentTypeChanged,
    FieldArgumentDefaultChanged,
    InputFieldAdded,
    InputFieldRemoved,
    InputFieldTypeChanged,
    EnumValueAdded,
    EnumValueRemoved,
    UnionMemberAdded,
    UnionMemberRemoved,
    FieldDeprecationAdded,
    FieldDeprecationRemoved,
}

/// One structural edit between two schema documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub criticality: Criticality,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    pub message: String,
    /// Dotted location, e.g. `Query.world`.
    pub path: String,
}
