use crate::{Collection, StoredEntity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Immutable snapshot of every collection, keyed by canonical (plural) type key.
///
/// Cloning is shallow: collections are shared until a write touches them.
/// The `with_*`/`without_*` methods return a new snapshot and leave `self`
/// untouched.
///
/// Serializes to the plain nested mapping
/// `{ "<key>": { "meta": {..}, "byId": { "<id>": { "meta": {..}, "data": {..} } } } }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    collections: BTreeMap<String, Arc<Collection>>,
}

impl Store {
    /// The empty store every process starts from.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a collection by its canonical key.
    #[must_use]
    pub fn collection(&self, key: &str) -> Option<&Collection> {
        self.collections.get(key).map(Arc::as_ref)
    }

    /// Looks up a stored entity by canonical key and id.
    #[must_use]
    pub fn entity(&self, key: &str, id: &str) -> Option<&StoredEntity> {
        self.collection(key)?.get(id)
    }

    /// Canonical keys of all collections present.
    pub fn collection_keys(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    #[must_use]
    pub fn contains_collection(&self, key: &str) -> bool {
        self.collections.contains_key(key)
    }

    /// Number of collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Returns a snapshot in which `edit` has been applied to the collection
    /// under `key`, creating an empty collection first when absent.
    ///
    /// Only the touched collection is copied, and only if it is shared.
    #[must_use]
    pub fn with_collection<F>(&self, key: &str, edit: F) -> Self
    where
        F: FnOnce(&mut Collection),
    {
        let mut next = self.clone();
        next.edit_collection(key, edit);
        next
    }

    /// In-place variant of [`Store::with_collection`] for callers that own
    /// the snapshot they are building.
    pub fn edit_collection<F>(&mut self, key: &str, edit: F)
    where
        F: FnOnce(&mut Collection),
    {
        let collection = self.collections.entry(key.to_string()).or_default();
        edit(Arc::make_mut(collection));
    }

    /// Returns a snapshot without the collection under `key`.
    #[must_use]
    pub fn without_collection(&self, key: &str) -> Self {
        if !self.collections.contains_key(key) {
            return self.clone();
        }
        let mut next = self.clone();
        next.collections.remove(key);
        next
    }

    /// Parses a snapshot from its JSON form (e.g. server-rendered state).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The snapshot as a JSON value.
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
