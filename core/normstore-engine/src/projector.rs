//! Raw entity → stored entity data.
//!
//! Attributes are flattened onto the top level next to `id`. Relationships
//! become id references: a single id (or null) for to-one, an ordered id
//! array under the pluralized name for to-many.

use crate::{Engine, EngineError, EngineResult};
use normstore_model::{Cardinality, EntityData, RelationshipLookup};
use normstore_types::{EntityId, RawEntity, ResourceLinkage};
use serde_json::Value;

/// A raw entity rewritten into store form, with the collection it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedEntity {
    pub collection_key: String,
    pub id: EntityId,
    pub data: EntityData,
}

impl Engine {
    /// Projects a raw entity into store form.
    ///
    /// Referenced ids are not checked for existence. Fails only when a
    /// registered schema rejects a relationship.
    pub fn project(&self, raw: &RawEntity) -> EngineResult<ProjectedEntity> {
        let mut projected = self.project_attributes(raw);
        for (name, relationship) in raw.relationships.iter().flatten() {
            let (key, value) = self.project_relationship(
                &projected.collection_key,
                name,
                relationship.data.as_ref(),
            )?;
            projected.data.insert(key, value);
        }
        Ok(projected)
    }

    /// `id` plus attributes; relationships are ignored.
    pub(crate) fn project_attributes(&self, raw: &RawEntity) -> ProjectedEntity {
        let mut data = EntityData::new();
        data.insert("id".to_string(), Value::String(raw.id.to_string()));
        if let Some(attributes) = &raw.attributes {
            for (key, value) in attributes {
                data.insert(key.clone(), value.clone());
            }
        }
        ProjectedEntity {
            collection_key: self.keys.plural_key(&raw.entity_type),
            id: raw.id.clone(),
            data,
        }
    }

    fn project_relationship(
        &self,
        collection_key: &str,
        name: &str,
        linkage: Option<&ResourceLinkage>,
    ) -> EngineResult<(String, Value)> {
        let found = match linkage {
            Some(ResourceLinkage::Many(_)) => Cardinality::Many,
            _ => Cardinality::One,
        };
        let key = match self.schemas.relationship(collection_key, name, &self.keys) {
            RelationshipLookup::Unschematized => match found {
                Cardinality::Many => self.keys.plural_key(name),
                Cardinality::One => name.to_string(),
            },
            RelationshipLookup::Declared(field) => {
                // null linkage is an empty to-many rather than a mismatch
                let mismatch = match (field.cardinality, linkage) {
                    (Cardinality::Many, Some(ResourceLinkage::One(_))) => true,
                    (Cardinality::One, Some(ResourceLinkage::Many(_))) => true,
                    _ => false,
                };
                if mismatch {
                    return Err(EngineError::CardinalityMismatch {
                        entity_type: collection_key.to_string(),
                        relationship: name.to_string(),
                        expected: field.cardinality,
                        found,
                    });
                }
                if field.cardinality == Cardinality::Many && linkage.is_none() {
                    return Ok((field.storage_key(&self.keys), Value::Array(Vec::new())));
                }
                field.storage_key(&self.keys)
            }
            RelationshipLookup::Undeclared => {
                return Err(EngineError::UnknownRelationship {
                    entity_type: collection_key.to_string(),
                    relationship: name.to_string(),
                });
            }
        };
        Ok((key, linkage_value(linkage)))
    }
}

fn linkage_value(linkage: Option<&ResourceLinkage>) -> Value {
    match linkage {
        Some(ResourceLinkage::Many(items)) => Value::Array(
            items
                .iter()
                .map(|item| Value::String(item.id.to_string()))
                .collect(),
        ),
        Some(ResourceLinkage::One(item)) => Value::String(item.id.to_string()),
        None => Value::Null,
    }
}
