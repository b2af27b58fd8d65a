//! Core type definitions for normstore.
//!
//! This crate defines the input side of the normalization engine:
//! - [`EntityId`]: the string identifier every entity is keyed by
//! - [`Document`] / [`RawEntity`]: the JSON:API document shape consumed by the normalizer
//! - [`IdGenerator`]: the injected "generate unique id" capability
//!
//! Nothing here knows about the store layout; that lives in `normstore-model`.

mod document;
mod ids;

pub use document::{
    Attributes, Document, PrimaryData, RawEntity, Relationship, ResourceIdentifier,
    ResourceLinkage,
};
pub use ids::{EntityId, IdGenerator, UuidV7Generator};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading documents.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
