use normstore_types::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flattened entity: `id`, attributes and relationship refs as top-level keys.
pub type EntityData = Map<String, Value>;

/// Free-form metadata attached to a collection or an entity.
pub type Meta = Map<String, Value>;

/// An entity as held in a collection.
///
/// `meta` belongs to the caller (loading flags, errors, pagination hints) and
/// is never touched by document normalization. `data` is what documents feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default)]
    pub data: EntityData,
}

impl StoredEntity {
    /// A wrapper with empty meta around the given data.
    #[must_use]
    pub fn new(data: EntityData) -> Self {
        Self {
            meta: Meta::new(),
            data,
        }
    }

    /// Placeholder holding only the id.
    #[must_use]
    pub fn placeholder(id: &EntityId) -> Self {
        let mut data = EntityData::new();
        data.insert("id".to_string(), Value::String(id.to_string()));
        Self::new(data)
    }

    /// The `id` recorded in `data`, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.data.get("id").and_then(Value::as_str)
    }

    /// True when `data` holds any key. A wrapper created by a meta write
    /// before the entity was ever loaded has none.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Resolve a JSON pointer (e.g., "/title", "/address/city") against `data`.
    #[must_use]
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let path = pointer.strip_prefix('/')?;
        let (head, rest) = match path.find('/') {
            Some(i) => (&path[..i], &path[i..]),
            None => (path, ""),
        };
        let key = head.replace("~1", "/").replace("~0", "~");
        let value = self.data.get(&key)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(rest)
        }
    }
}
