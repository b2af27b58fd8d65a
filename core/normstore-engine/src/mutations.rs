//! Store-transforming operations.
//!
//! Each takes a snapshot and returns a new one. Relationship mutations are
//! the only fallible ones: they need an existing owner and a to-many target.

use crate::merge::merge_entity;
use crate::{Engine, EngineError, EngineResult};
use normstore_model::{Cardinality, Meta, RelationshipLookup, Store, StoredEntity};
use normstore_types::{Attributes, Document, EntityId, RawEntity};
use serde_json::Value;
use tracing::debug;

impl Engine {
    /// Shallow-merges `attributes` into an entity, creating it if needed.
    ///
    /// Equivalent to normalizing a single-entity document carrying only
    /// these attributes, so `mostRecentlyLoaded` is not touched.
    #[must_use]
    pub fn update_entity(
        &self,
        store: &Store,
        entity_type: &str,
        id: &str,
        attributes: &Attributes,
    ) -> Store {
        let raw = RawEntity::new(entity_type, id).with_attributes(attributes.clone());
        merge_entity(store, self.project_attributes(&raw))
    }

    /// Creates an entity under a freshly generated id.
    #[must_use]
    pub fn insert_new_entity(
        &self,
        store: &Store,
        entity_type: &str,
        attributes: Attributes,
    ) -> (Store, EntityId) {
        let id = self.ids.generate();
        let raw = RawEntity::new(entity_type, id.clone()).with_attributes(attributes);
        debug!(entity_type, %id, "inserting new entity");
        (merge_entity(store, self.project_attributes(&raw)), id)
    }

    /// Stores `related`, then appends its id to the owner's to-many
    /// `relationship`. An id already present is moved to the end.
    pub fn add_relationship(
        &self,
        store: &Store,
        entity_type: &str,
        id: &str,
        relationship: &str,
        related: &RawEntity,
    ) -> EngineResult<Store> {
        let key = self.keys.plural_key(entity_type);
        let owner = owner(store, &key, id)?;
        let rel_key = self.to_many_key(&key, owner, relationship)?;

        let mut next = self.normalize_document(store, &Document::single(related.clone()))?;
        let related_id = Value::String(related.id.to_string());
        next.edit_collection(&key, |collection| {
            let stored = collection.entity_mut(&EntityId::from(id));
            let mut ids = match stored.data.get(&rel_key) {
                Some(Value::Array(ids)) => ids.clone(),
                _ => Vec::new(),
            };
            ids.retain(|existing| existing != &related_id);
            ids.push(related_id);
            stored.data.insert(rel_key.clone(), Value::Array(ids));
        });

        debug!(collection = %key, id, relationship = %rel_key, related = %related.id, "added relationship");
        Ok(next)
    }

    /// Removes `related_id` from the owner's to-many `relationship`.
    /// Absent ids and empty relationships leave the store as it was.
    pub fn remove_relationship(
        &self,
        store: &Store,
        entity_type: &str,
        id: &str,
        relationship: &str,
        related_id: &str,
    ) -> EngineResult<Store> {
        let key = self.keys.plural_key(entity_type);
        let owner = owner(store, &key, id)?;
        let rel_key = self.to_many_key(&key, owner, relationship)?;

        let related = Value::String(related_id.to_string());
        let present = matches!(
            owner.data.get(&rel_key),
            Some(Value::Array(ids)) if ids.contains(&related)
        );
        if !present {
            return Ok(store.clone());
        }

        debug!(collection = %key, id, relationship = %rel_key, related = related_id, "removed relationship");
        Ok(store.with_collection(&key, |collection| {
            let stored = collection.entity_mut(&EntityId::from(id));
            if let Some(Value::Array(ids)) = stored.data.get_mut(&rel_key) {
                ids.retain(|existing| existing != &related);
            }
        }))
    }

    /// Sets collection meta.
    ///
    /// With a `meta_key`, sets that one key. Without, replaces the whole meta
    /// object with `value` (a non-object counts as `{}`) but carries
    /// `mostRecentlyLoaded` over, defaulting it to `[]`.
    #[must_use]
    pub fn update_entities_meta(
        &self,
        store: &Store,
        entity_type: &str,
        meta_key: Option<&str>,
        value: Value,
    ) -> Store {
        let key = self.keys.plural_key(entity_type);
        store.with_collection(&key, |collection| match meta_key {
            Some(meta_key) => {
                collection.meta.insert(meta_key.to_string(), value);
            }
            None => {
                let loaded = collection
                    .meta
                    .remove(normstore_model::MOST_RECENTLY_LOADED)
                    .unwrap_or_else(|| Value::Array(Vec::new()));
                let mut meta = into_meta(value);
                meta.insert(normstore_model::MOST_RECENTLY_LOADED.to_string(), loaded);
                collection.meta = meta;
            }
        })
    }

    /// Sets entity meta, with the same key/replace semantics as
    /// [`Engine::update_entities_meta`] minus the `mostRecentlyLoaded` carry.
    ///
    /// A missing entity gets a wrapper with empty `data`; use
    /// [`Engine::ensure_placeholder`] first when the id should be readable.
    #[must_use]
    pub fn update_entity_meta(
        &self,
        store: &Store,
        entity_type: &str,
        id: &str,
        meta_key: Option<&str>,
        value: Value,
    ) -> Store {
        let key = self.keys.plural_key(entity_type);
        if store.entity(&key, id).is_none() {
            debug!(collection = %key, id, "meta written before entity data");
        }
        store.with_collection(&key, |collection| {
            let stored = collection.entity_mut(&EntityId::from(id));
            match meta_key {
                Some(meta_key) => {
                    stored.meta.insert(meta_key.to_string(), value);
                }
                None => stored.meta = into_meta(value),
            }
        })
    }

    /// Makes sure an entity exists with at least its `id` in `data`.
    ///
    /// Existing data and meta are kept.
    #[must_use]
    pub fn ensure_placeholder(&self, store: &Store, entity_type: &str, id: &str) -> Store {
        let key = self.keys.plural_key(entity_type);
        if store.entity(&key, id).is_some_and(|e| e.id().is_some()) {
            return store.clone();
        }
        store.with_collection(&key, |collection| {
            let entity_id = EntityId::from(id);
            let stored = collection.entity_mut(&entity_id);
            let placeholder = StoredEntity::placeholder(&entity_id);
            for (k, v) in placeholder.data {
                stored.data.entry(k).or_insert(v);
            }
        })
    }

    /// Deletes one entity. Collection meta is untouched.
    #[must_use]
    pub fn remove_entity(&self, store: &Store, entity_type: &str, id: &str) -> Store {
        let key = self.keys.plural_key(entity_type);
        if store.entity(&key, id).is_none() {
            return store.clone();
        }
        store.with_collection(&key, |collection| {
            collection.remove(id);
        })
    }

    /// Deletes a whole collection.
    #[must_use]
    pub fn clear_entity_type(&self, store: &Store, entity_type: &str) -> Store {
        store.without_collection(&self.keys.plural_key(entity_type))
    }

    /// Resolves where a to-many relationship is stored on `owner`.
    fn to_many_key(
        &self,
        collection_key: &str,
        owner: &StoredEntity,
        relationship: &str,
    ) -> EngineResult<String> {
        let mismatch = || EngineError::CardinalityMismatch {
            entity_type: collection_key.to_string(),
            relationship: relationship.to_string(),
            expected: Cardinality::Many,
            found: Cardinality::One,
        };
        match self.schemas.relationship(collection_key, relationship, &self.keys) {
            RelationshipLookup::Declared(field) if field.cardinality == Cardinality::Many => {
                Ok(field.storage_key(&self.keys))
            }
            RelationshipLookup::Declared(_) => Err(mismatch()),
            RelationshipLookup::Undeclared => Err(EngineError::UnknownRelationship {
                entity_type: collection_key.to_string(),
                relationship: relationship.to_string(),
            }),
            RelationshipLookup::Unschematized => {
                let key = self.keys.plural_key(relationship);
                let holds_scalar = |k: &str| {
                    owner
                        .data
                        .get(k)
                        .is_some_and(|v| !v.is_array() && !v.is_null())
                };
                if holds_scalar(&key) || (key != relationship && holds_scalar(relationship)) {
                    return Err(mismatch());
                }
                Ok(key)
            }
        }
    }
}

fn owner<'s>(store: &'s Store, collection_key: &str, id: &str) -> EngineResult<&'s StoredEntity> {
    store
        .entity(collection_key, id)
        .ok_or_else(|| EngineError::EntityNotFound {
            entity_type: collection_key.to_string(),
            id: EntityId::from(id),
        })
}

fn into_meta(value: Value) -> Meta {
    match value {
        Value::Object(map) => map,
        _ => Meta::new(),
    }
}
