//! Normalization engine for JSON:API documents.
//!
//! Folds documents (primary data plus `included`) into a flat [`Store`] keyed
//! by canonical type and id, applies mutations that keep the store's
//! invariants, and reads denormalized entity graphs back out.
//!
//! Every operation takes a snapshot by reference and returns a new one; the
//! input is never modified, so readers holding an older snapshot are never
//! affected by later writes.
//!
//! ```
//! use normstore_engine::Engine;
//! use normstore_model::Store;
//! use normstore_types::Document;
//!
//! let engine = Engine::new();
//! let doc = Document::from_json(r#"{"data": {"type": "article", "id": "1",
//!     "attributes": {"title": "T"}}}"#).unwrap();
//! let store = engine.normalize_document(&Store::new(), &doc).unwrap();
//! assert_eq!(engine.get_entity(&store, "articles", "1").unwrap()["title"], "T");
//! ```

mod accessors;
mod commands;
mod config;
mod engine;
mod error;
mod merge;
mod mutations;
mod normalize;
mod projector;

pub use accessors::Relations;
pub use commands::{Command, action_names};
pub use config::EngineConfig;
pub use engine::{Engine, EngineBuilder};
pub use error::{EngineError, EngineResult};
pub use merge::merge_entity;
pub use projector::ProjectedEntity;

pub use normstore_model::Store;
