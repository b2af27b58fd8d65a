//! Error types for engine operations.

use normstore_model::Cardinality;
use normstore_types::EntityId;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by mutations and document normalization.
///
/// Reads never fail; a missing entity or collection reads as absent.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A relationship mutation named an owning entity that is not stored.
    #[error("entity not found: {entity_type}/{id}")]
    EntityNotFound { entity_type: String, id: EntityId },

    /// The owning type has a schema that does not declare this relationship.
    #[error("unknown relationship {relationship:?} on {entity_type}")]
    UnknownRelationship {
        entity_type: String,
        relationship: String,
    },

    /// The relationship holds (or was declared with) the other cardinality.
    #[error("relationship {relationship:?} on {entity_type} is {found}, expected {expected}")]
    CardinalityMismatch {
        entity_type: String,
        relationship: String,
        expected: Cardinality,
        found: Cardinality,
    },

    /// Command or configuration JSON could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document could not be read.
    #[error("document error: {0}")]
    Document(#[from] normstore_types::Error),
}
