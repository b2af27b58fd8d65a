use crate::{Meta, StoredEntity};
use normstore_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Collection meta key holding the primary ids of the latest document load.
pub const MOST_RECENTLY_LOADED: &str = "mostRecentlyLoaded";

/// All stored entities of one type plus collection-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub meta: Meta,
    #[serde(rename = "byId", default)]
    pub by_id: BTreeMap<EntityId, Arc<StoredEntity>>,
}

impl Collection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a stored entity by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&StoredEntity> {
        self.by_id.get(id).map(Arc::as_ref)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Mutable access to an entity, inserting an empty wrapper when absent.
    ///
    /// Clones the entity only if another snapshot still shares it.
    pub fn entity_mut(&mut self, id: &EntityId) -> &mut StoredEntity {
        Arc::make_mut(self.by_id.entry(id.clone()).or_default())
    }

    /// Removes an entity, returning whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.by_id.remove(id).is_some()
    }

    /// Ids in iteration order.
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.by_id.keys()
    }

    /// Stored entities in iteration order.
    pub fn entities(&self) -> impl Iterator<Item = &StoredEntity> {
        self.by_id.values().map(Arc::as_ref)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Ids stamped by the most recent document load, if one has happened.
    #[must_use]
    pub fn most_recently_loaded(&self) -> Option<Vec<EntityId>> {
        let ids = self.meta.get(MOST_RECENTLY_LOADED)?.as_array()?;
        Some(
            ids.iter()
                .filter_map(Value::as_str)
                .map(EntityId::from)
                .collect(),
        )
    }

    /// Overwrites the `mostRecentlyLoaded` stamp, leaving other meta keys alone.
    pub fn set_most_recently_loaded(&mut self, ids: &[EntityId]) {
        let value = ids
            .iter()
            .map(|id| Value::String(id.to_string()))
            .collect();
        self.meta
            .insert(MOST_RECENTLY_LOADED.to_string(), Value::Array(value));
    }
}
