//! Folding projected entities into a store.

use crate::ProjectedEntity;
use normstore_model::{Collection, Store};

/// Inserts or merges one projected entity into its collection.
///
/// An existing entity keeps its `meta`; its `data` is shallow-merged, so keys
/// present in `entity` overwrite and all other keys survive. Collection meta
/// is untouched.
#[must_use]
pub fn merge_entity(store: &Store, entity: ProjectedEntity) -> Store {
    let mut next = store.clone();
    merge_in_place(&mut next, entity);
    next
}

/// Same as [`merge_entity`] on a snapshot the caller is still building.
pub(crate) fn merge_in_place(store: &mut Store, entity: ProjectedEntity) {
    let ProjectedEntity {
        collection_key,
        id,
        data,
    } = entity;
    store.edit_collection(&collection_key, |collection: &mut Collection| {
        let stored = collection.entity_mut(&id);
        for (key, value) in data {
            stored.data.insert(key, value);
        }
    });
}
