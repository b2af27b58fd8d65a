use crate::merge::merge_in_place;
use crate::{Engine, EngineResult};
use normstore_model::Store;
use normstore_types::Document;
use tracing::debug;

impl Engine {
    /// Folds a document into the store.
    ///
    /// Primary entities are merged first, then `included`, in document order;
    /// a later occurrence of the same id wins on conflicting keys. When the
    /// primary data is a non-empty array, the primary collection's
    /// `mostRecentlyLoaded` is set to the primary ids in order.
    ///
    /// Fails without producing a snapshot if a schema rejects a relationship.
    pub fn normalize_document(&self, store: &Store, document: &Document) -> EngineResult<Store> {
        let primary = document.data.entities();
        let mut next = store.clone();

        for raw in primary.iter().chain(&document.included) {
            merge_in_place(&mut next, self.project(raw)?);
        }

        if document.data.is_many()
            && let Some(first) = primary.first()
        {
            let key = self.keys.plural_key(&first.entity_type);
            let ids = document.ids();
            next.edit_collection(&key, |collection| {
                collection.set_most_recently_loaded(&ids);
            });
        }

        debug!(
            primary = primary.len(),
            included = document.included.len(),
            "normalized document"
        );
        Ok(next)
    }
}
