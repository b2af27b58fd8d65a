//! Store model for normstore.
//!
//! Defines the types every engine operation reads and produces:
//! - [`Store`]: immutable snapshot mapping canonical type keys to collections
//! - [`Collection`]: collection-level `meta` plus entities keyed by id
//! - [`StoredEntity`]: entity-level `meta` plus the flattened entity `data`
//! - [`Inflector`] / [`KeyNormalizer`]: type name to storage key conversion
//! - [`EntitySchema`] / [`SchemaRegistry`]: optional declared relationship shapes
//!
//! Snapshots share unchanged collections and entities through `Arc`, so an
//! operation only copies the path it touches and older snapshots stay valid.

mod collection;
mod entity;
mod inflect;
mod schema;
mod store;

pub use collection::{Collection, MOST_RECENTLY_LOADED};
pub use entity::{EntityData, Meta, StoredEntity};
pub use inflect::{EnglishInflector, Inflector, KeyNormalizer};
pub use schema::{Cardinality, EntitySchema, RelationshipField, RelationshipLookup, SchemaRegistry};
pub use store::Store;
