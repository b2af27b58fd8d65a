//! Serializable commands and their dispatch onto engine operations.

use crate::{Engine, EngineResult};
use normstore_model::{KeyNormalizer, Store};
use normstore_types::{Attributes, Document, RawEntity};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Prefixes of the routing names produced by [`Command::action_type`].
pub mod action_names {
    pub const LOAD_DATA: &str = "LOAD_DATA";
    pub const UPDATE_ENTITY: &str = "UPDATE_ENTITY";
    pub const ADD_RELATIONSHIP: &str = "ADD_RELATIONSHIP";
    pub const REMOVE_RELATIONSHIP: &str = "REMOVE_RELATIONSHIP";
    pub const UPDATE_ENTITIES_META: &str = "UPDATE_ENTITIES_META";
    pub const UPDATE_ENTITY_META: &str = "UPDATE_ENTITY_META";
    pub const ENSURE_PLACEHOLDER: &str = "ENSURE_PLACEHOLDER";
    pub const REMOVE_ENTITY: &str = "REMOVE_ENTITY";
    pub const CLEAR_ENTITY_TYPE: &str = "CLEAR_ENTITY_TYPE";
}

/// One store mutation, as sent by a dispatch layer.
///
/// Encoded as `{"op": "<Variant>", "data": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum Command {
    LoadData {
        document: Document,
    },
    UpdateEntity {
        entity_type: String,
        id: String,
        attributes: Attributes,
    },
    AddRelationship {
        entity_type: String,
        id: String,
        relationship: String,
        related: RawEntity,
    },
    RemoveRelationship {
        entity_type: String,
        id: String,
        relationship: String,
        related_id: String,
    },
    UpdateEntitiesMeta {
        entity_type: String,
        #[serde(default)]
        meta_key: Option<String>,
        value: Value,
    },
    UpdateEntityMeta {
        entity_type: String,
        id: String,
        #[serde(default)]
        meta_key: Option<String>,
        value: Value,
    },
    EnsurePlaceholder {
        entity_type: String,
        id: String,
    },
    RemoveEntity {
        entity_type: String,
        id: String,
    },
    ClearEntityType {
        entity_type: String,
    },
}

impl Command {
    /// Routing name, distinct per entity type and, for relationship
    /// commands, per relationship.
    ///
    /// Per-entity commands use the singular type, collection-wide ones the
    /// plural, e.g. `UPDATE_ENTITY_ARTICLE`, `CLEAR_ENTITY_TYPE_ARTICLES`,
    /// `ADD_RELATIONSHIP_ARTICLE_COMMENTS`.
    #[must_use]
    pub fn action_type(&self, keys: &KeyNormalizer) -> String {
        use action_names::*;

        let singular = |name: &str| constant_case(&keys.singular_key(name));
        let plural = |name: &str| constant_case(&keys.plural_key(name));
        match self {
            Self::LoadData { .. } => LOAD_DATA.to_string(),
            Self::UpdateEntity { entity_type, .. } => {
                format!("{UPDATE_ENTITY}_{}", singular(entity_type))
            }
            Self::AddRelationship {
                entity_type,
                relationship,
                ..
            } => format!(
                "{ADD_RELATIONSHIP}_{}_{}",
                singular(entity_type),
                plural(relationship)
            ),
            Self::RemoveRelationship {
                entity_type,
                relationship,
                ..
            } => format!(
                "{REMOVE_RELATIONSHIP}_{}_{}",
                singular(entity_type),
                plural(relationship)
            ),
            Self::UpdateEntitiesMeta { entity_type, .. } => {
                format!("{UPDATE_ENTITIES_META}_{}", plural(entity_type))
            }
            Self::UpdateEntityMeta { entity_type, .. } => {
                format!("{UPDATE_ENTITY_META}_{}", singular(entity_type))
            }
            Self::EnsurePlaceholder { entity_type, .. } => {
                format!("{ENSURE_PLACEHOLDER}_{}", singular(entity_type))
            }
            Self::RemoveEntity { entity_type, .. } => {
                format!("{REMOVE_ENTITY}_{}", singular(entity_type))
            }
            Self::ClearEntityType { entity_type } => {
                format!("{CLEAR_ENTITY_TYPE}_{}", plural(entity_type))
            }
        }
    }
}

fn constant_case(name: &str) -> String {
    name.replace('-', "_").to_uppercase()
}

impl Engine {
    /// Runs one command against a snapshot.
    pub fn apply(&self, store: &Store, command: &Command) -> EngineResult<Store> {
        debug!(action = %command.action_type(&self.keys), "applying command");

        let result = match command {
            Command::LoadData { document } => self.normalize_document(store, document),
            Command::UpdateEntity {
                entity_type,
                id,
                attributes,
            } => Ok(self.update_entity(store, entity_type, id, attributes)),
            Command::AddRelationship {
                entity_type,
                id,
                relationship,
                related,
            } => self.add_relationship(store, entity_type, id, relationship, related),
            Command::RemoveRelationship {
                entity_type,
                id,
                relationship,
                related_id,
            } => self.remove_relationship(store, entity_type, id, relationship, related_id),
            Command::UpdateEntitiesMeta {
                entity_type,
                meta_key,
                value,
            } => Ok(self.update_entities_meta(
                store,
                entity_type,
                meta_key.as_deref(),
                value.clone(),
            )),
            Command::UpdateEntityMeta {
                entity_type,
                id,
                meta_key,
                value,
            } => Ok(self.update_entity_meta(
                store,
                entity_type,
                id,
                meta_key.as_deref(),
                value.clone(),
            )),
            Command::EnsurePlaceholder { entity_type, id } => {
                Ok(self.ensure_placeholder(store, entity_type, id))
            }
            Command::RemoveEntity { entity_type, id } => {
                Ok(self.remove_entity(store, entity_type, id))
            }
            Command::ClearEntityType { entity_type } => {
                Ok(self.clear_entity_type(store, entity_type))
            }
        };

        if let Err(e) = &result {
            warn!(action = %command.action_type(&self.keys), "command rejected: {e}");
        }
        result
    }

    /// Runs commands in order, stopping at the first rejection.
    ///
    /// On error the input snapshot is unaffected and no partial result is
    /// returned.
    pub fn apply_all<'c>(
        &self,
        store: &Store,
        commands: impl IntoIterator<Item = &'c Command>,
    ) -> EngineResult<Store> {
        commands
            .into_iter()
            .try_fold(store.clone(), |acc, command| self.apply(&acc, command))
    }
}
