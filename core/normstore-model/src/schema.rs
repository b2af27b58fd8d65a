use crate::KeyNormalizer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Declares an entity type's relationships.
///
/// Types without a registered schema fall back to inferring to-one vs to-many
/// from the shape of each value. Once a schema is registered, its declarations
/// are authoritative and relationships it does not list are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    #[serde(default)]
    pub relationships: Vec<RelationshipField>,
}

impl EntitySchema {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            relationships: Vec::new(),
        }
    }

    /// Adds a relationship declaration.
    #[must_use]
    pub fn with(mut self, field: RelationshipField) -> Self {
        self.relationships.push(field);
        self
    }
}

/// One declared relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipField {
    /// Relationship name as it appears in documents (e.g., "author", "comments").
    pub name: String,
    pub cardinality: Cardinality,
    /// Entity type the relationship points at. Any spelling; it is pluralized on use.
    pub target_type: String,
}

impl RelationshipField {
    /// Shorthand for a to-one relationship.
    pub fn one(name: &str, target_type: &str) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::One,
            target_type: target_type.into(),
        }
    }

    /// Shorthand for a to-many relationship.
    pub fn many(name: &str, target_type: &str) -> Self {
        Self {
            name: name.into(),
            cardinality: Cardinality::Many,
            target_type: target_type.into(),
        }
    }

    /// Key the relationship is stored under in entity data.
    ///
    /// To-many relationships live under the pluralized name.
    #[must_use]
    pub fn storage_key(&self, keys: &KeyNormalizer) -> String {
        match self.cardinality {
            Cardinality::One => self.name.clone(),
            Cardinality::Many => keys.plural_key(&self.name),
        }
    }
}

/// Whether a relationship holds one id or an ordered list of ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    One,
    Many,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => f.write_str("to-one"),
            Self::Many => f.write_str("to-many"),
        }
    }
}

/// Outcome of looking a relationship up in the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelationshipLookup<'a> {
    /// No schema registered for the owning type; infer from value shape.
    Unschematized,
    /// The owning type's schema declares this relationship.
    Declared(&'a RelationshipField),
    /// The owning type has a schema and it does not list this relationship.
    Undeclared,
}

/// Schemas indexed by canonical collection key.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    by_key: HashMap<String, EntitySchema>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema, replacing any previous one for the same type.
    pub fn register(&mut self, schema: EntitySchema, keys: &KeyNormalizer) {
        self.by_key.insert(keys.plural_key(&schema.entity_type), schema);
    }

    /// Schema for a canonical collection key.
    #[must_use]
    pub fn get(&self, collection_key: &str) -> Option<&EntitySchema> {
        self.by_key.get(collection_key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Finds the declaration for `name` on the type stored under
    /// `collection_key`. Singular and plural spellings of a to-many name match.
    #[must_use]
    pub fn relationship<'a>(
        &'a self,
        collection_key: &str,
        name: &str,
        keys: &KeyNormalizer,
    ) -> RelationshipLookup<'a> {
        let Some(schema) = self.by_key.get(collection_key) else {
            return RelationshipLookup::Unschematized;
        };
        schema
            .relationships
            .iter()
            .find(|field| {
                field.name == name
                    || (field.cardinality == Cardinality::Many
                        && field.storage_key(keys) == keys.plural_key(name))
            })
            .map_or(RelationshipLookup::Undeclared, RelationshipLookup::Declared)
    }
}
