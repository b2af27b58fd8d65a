//! JSON:API document shapes consumed by the normalizer.
//!
//! Only the parts the engine reads are modelled: `type`, `id`, `attributes`
//! and relationship linkage. Links, top-level `meta` and `jsonapi` members
//! are accepted and ignored.

use crate::{EntityId, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Attribute bag of a raw entity.
pub type Attributes = Map<String, Value>;

/// A full document: primary data plus the `included` side-list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub data: PrimaryData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<RawEntity>,
}

impl Document {
    /// A document whose primary data is one entity.
    #[must_use]
    pub fn single(entity: RawEntity) -> Self {
        Self {
            data: PrimaryData::One(Box::new(entity)),
            included: Vec::new(),
        }
    }

    /// A document whose primary data is an array of entities.
    #[must_use]
    pub fn many(entities: Vec<RawEntity>) -> Self {
        Self {
            data: PrimaryData::Many(entities),
            included: Vec::new(),
        }
    }

    /// Replaces the `included` list.
    #[must_use]
    pub fn with_included(mut self, included: Vec<RawEntity>) -> Self {
        self.included = included;
        self
    }

    /// Parses a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a document from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidDocument(
                "document must be a JSON object".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Id of a single-entity primary payload. `None` for array payloads.
    #[must_use]
    pub fn id(&self) -> Option<&EntityId> {
        match &self.data {
            PrimaryData::One(entity) => Some(&entity.id),
            PrimaryData::Many(_) => None,
        }
    }

    /// Ids of the primary payload in document order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.data.entities().iter().map(|e| e.id.clone()).collect()
    }
}

/// Primary payload of a document: one entity or an array of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<RawEntity>),
    One(Box<RawEntity>),
}

impl PrimaryData {
    /// The payload coerced to a slice.
    #[must_use]
    pub fn entities(&self) -> &[RawEntity] {
        match self {
            Self::Many(entities) => entities,
            Self::One(entity) => std::slice::from_ref(entity.as_ref()),
        }
    }

    #[must_use]
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

/// An entity as it appears in a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<String, Relationship>>,
}

impl RawEntity {
    /// A bare entity with no attributes or relationships.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: id.into(),
            attributes: None,
            relationships: None,
        }
    }

    /// Sets the attribute bag.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Adds (or replaces) a relationship.
    #[must_use]
    pub fn with_relationship(mut self, name: impl Into<String>, data: ResourceLinkage) -> Self {
        self.relationships
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), Relationship { data: Some(data) });
        self
    }
}

/// A relationship object. `data` is absent or `null` for an empty to-one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceLinkage>,
}

/// Relationship linkage: a single identifier or an ordered array of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceLinkage {
    Many(Vec<ResourceIdentifier>),
    One(ResourceIdentifier),
}

impl ResourceLinkage {
    /// Linkage to a single entity.
    #[must_use]
    pub fn one(entity_type: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self::One(ResourceIdentifier::new(entity_type, id))
    }

    /// Linkage to an ordered list of entities of one type.
    pub fn many<I, T>(entity_type: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<EntityId>,
    {
        Self::Many(
            ids.into_iter()
                .map(|id| ResourceIdentifier::new(entity_type, id))
                .collect(),
        )
    }

    /// Referenced ids in linkage order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        match self {
            Self::Many(items) => items.iter().map(|r| r.id.clone()).collect(),
            Self::One(item) => vec![item.id.clone()],
        }
    }
}

/// A `{type, id}` pair inside relationship linkage. Extra members are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    pub id: EntityId,
}

impl ResourceIdentifier {
    #[must_use]
    pub fn new(entity_type: impl Into<String>, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: Some(entity_type.into()),
            id: id.into(),
        }
    }
}
