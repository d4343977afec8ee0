//! Error types for document generation.

use std::io;

use crate::schema::Kind;

/// The schema contains something the generator has no rule for.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Field kind without a display label or example value.
    #[error("field {field}: unsupported kind {kind}")]
    UnknownKind { field: String, kind: Kind },

    /// Referenced message or enum is not registered.
    #[error("unresolved type {0}")]
    UnresolvedType(String),

    /// Map entry message without key or value field.
    #[error("invalid map entry {0}")]
    InvalidMapEntry(String),
}

/// Failure while producing a service document.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to format example payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write document for service {service}: {source}")]
    Write {
        service: String,
        #[source]
        source: io::Error,
    },
}
