use thiserror::Error;

use crate::compose::CompositionError;

/// Which side of a diff failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSide {
    Old,
    New,
}

impl std::fmt::Display for DocumentSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentSide::Old => write!(f, "old"),
            DocumentSide::New => write!(f, "new"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("not found")]
    NotFound,

    #[error("unknown or inactive graph: {0}")]
    InvalidGraphName(String),

    #[error("no active schema version for service: {0}")]
    VersionLookup(String),

    #[error("schema composition failed")]
    Composition(Vec<CompositionError>),

    #[error("failed to parse {side} schema document: {message}")]
    Parse { side: DocumentSide, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),
}

pub type Result<T> = std::result::Result<T, Error>;
