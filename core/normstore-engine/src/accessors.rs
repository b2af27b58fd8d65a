//! Read-side lookups and relationship resolution.
//!
//! Reads are total: anything missing comes back as `None`, is skipped, or
//! resolves to `null`.

use crate::Engine;
use normstore_model::{EntityData, RelationshipLookup, Store};
use normstore_types::EntityId;
use serde_json::Value;

/// Relationship names to resolve when reading an entity graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations<'a>(Vec<&'a str>);

impl<'a> Relations<'a> {
    /// Resolve nothing; the base entity is returned as stored.
    #[must_use]
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.0.iter().copied()
    }
}

impl<'a> From<&'a str> for Relations<'a> {
    fn from(name: &'a str) -> Self {
        Self(vec![name])
    }
}

impl<'a> From<&[&'a str]> for Relations<'a> {
    fn from(names: &[&'a str]) -> Self {
        Self(names.to_vec())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Relations<'a> {
    fn from(names: [&'a str; N]) -> Self {
        Self(names.to_vec())
    }
}

impl<'a> From<Vec<&'a str>> for Relations<'a> {
    fn from(names: Vec<&'a str>) -> Self {
        Self(names)
    }
}

impl Engine {
    /// Stored `data` of one entity. `entity_type` may be singular or plural.
    #[must_use]
    pub fn get_entity<'s>(
        &self,
        store: &'s Store,
        entity_type: &str,
        id: &str,
    ) -> Option<&'s EntityData> {
        store
            .entity(&self.keys.plural_key(entity_type), id)
            .map(|stored| &stored.data)
    }

    /// Stored `data` of several entities.
    ///
    /// With `ids`, results follow the given order and unknown ids are dropped.
    /// Without, every entity in the collection is returned in id order.
    #[must_use]
    pub fn get_entities<'s>(
        &self,
        store: &'s Store,
        entity_type: &str,
        ids: Option<&[EntityId]>,
    ) -> Vec<&'s EntityData> {
        let Some(collection) = store.collection(&self.keys.plural_key(entity_type)) else {
            return Vec::new();
        };
        match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| collection.get(id.as_str()))
                .map(|stored| &stored.data)
                .collect(),
            None => collection.entities().map(|stored| &stored.data).collect(),
        }
    }

    /// One entity with the named relationships replaced by the entities they
    /// reference.
    ///
    /// A to-one id resolves to the entity's data, or `null` when it is not
    /// stored. A to-many array resolves to the stored entities only, in order.
    /// Relationships the entity does not hold are left out.
    ///
    /// Stored refs keep only ids, so the target collection comes from the
    /// relationship's schema `target_type` when one is registered, and from
    /// the pluralized relation name otherwise (`comments` reads `comments`,
    /// `author` reads `authors`). A relation named differently from the type it
    /// points at (`author` → `person`) needs a schema to resolve.
    #[must_use]
    pub fn get_entity_with_relationships<'r>(
        &self,
        store: &Store,
        entity_type: &str,
        id: &str,
        relations: impl Into<Relations<'r>>,
    ) -> Option<EntityData> {
        let collection_key = self.keys.plural_key(entity_type);
        let stored = store.entity(&collection_key, id)?;
        Some(self.resolve(store, &collection_key, &stored.data, &relations.into()))
    }

    /// [`Engine::get_entities`] with relationship resolution per entity.
    #[must_use]
    pub fn get_entities_with_relationships<'r>(
        &self,
        store: &Store,
        entity_type: &str,
        ids: Option<&[EntityId]>,
        relations: impl Into<Relations<'r>>,
    ) -> Vec<EntityData> {
        let collection_key = self.keys.plural_key(entity_type);
        let relations = relations.into();
        self.get_entities(store, entity_type, ids)
            .into_iter()
            .map(|data| self.resolve(store, &collection_key, data, &relations))
            .collect()
    }

    /// One value from an entity's `data`, addressed by JSON pointer
    /// (`/title`, `/address/city`, `/comments/0`).
    #[must_use]
    pub fn get_field<'s>(
        &self,
        store: &'s Store,
        entity_type: &str,
        id: &str,
        pointer: &str,
    ) -> Option<&'s Value> {
        store
            .entity(&self.keys.plural_key(entity_type), id)?
            .pointer(pointer)
    }

    /// Entities stamped by the latest array load of this type, in load order,
    /// with `relations` resolved. Empty if no array load has happened.
    #[must_use]
    pub fn get_most_recently_loaded<'r>(
        &self,
        store: &Store,
        entity_type: &str,
        relations: impl Into<Relations<'r>>,
    ) -> Vec<EntityData> {
        let ids = store
            .collection(&self.keys.plural_key(entity_type))
            .and_then(|collection| collection.most_recently_loaded())
            .unwrap_or_default();
        self.get_entities_with_relationships(store, entity_type, Some(&ids), relations)
    }

    fn resolve(
        &self,
        store: &Store,
        collection_key: &str,
        data: &EntityData,
        relations: &Relations<'_>,
    ) -> EntityData {
        let mut resolved = data.clone();
        for name in relations.iter() {
            let Some((key, target)) = self.relation_target(collection_key, data, name) else {
                continue;
            };
            let value = match &data[&key] {
                Value::String(id) => self
                    .get_entity(store, &target, id)
                    .map_or(Value::Null, |found| Value::Object(found.clone())),
                Value::Array(ids) => Value::Array(
                    ids.iter()
                        .filter_map(Value::as_str)
                        .filter_map(|id| self.get_entity(store, &target, id))
                        .map(|found| Value::Object(found.clone()))
                        .collect(),
                ),
                _ => continue,
            };
            resolved.insert(key, value);
        }
        resolved
    }

    /// The data key a relationship is held under and the type it points at.
    fn relation_target(
        &self,
        collection_key: &str,
        data: &EntityData,
        name: &str,
    ) -> Option<(String, String)> {
        if let RelationshipLookup::Declared(field) =
            self.schemas.relationship(collection_key, name, &self.keys)
        {
            let key = field.storage_key(&self.keys);
            return data
                .contains_key(&key)
                .then(|| (key, field.target_type.clone()));
        }
        let plural = self.keys.plural_key(name);
        let key = [name, plural.as_str()]
            .into_iter()
            .find(|key| data.contains_key(*key))?;
        Some((key.to_string(), plural))
    }
}
