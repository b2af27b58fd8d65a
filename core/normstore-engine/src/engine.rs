use crate::EngineConfig;
use normstore_model::{EntitySchema, Inflector, KeyNormalizer, SchemaRegistry};
use normstore_types::{IdGenerator, UuidV7Generator};
use std::fmt;
use std::sync::Arc;

/// Handle carrying the injected collaborators every operation needs:
/// key inflection, relationship schemas and id generation.
///
/// The engine holds no store. Callers own their snapshots and thread the
/// returned value into the next call.
#[derive(Clone)]
pub struct Engine {
    pub(crate) keys: KeyNormalizer,
    pub(crate) schemas: SchemaRegistry,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl Engine {
    /// English inflection, no schemas, UUID v7 ids.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Builds an engine from file-level configuration.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        config
            .schemas
            .iter()
            .cloned()
            .fold(
                Self::builder().inflector(config.inflector()),
                EngineBuilder::schema,
            )
            .build()
    }

    #[must_use]
    pub fn keys(&self) -> &KeyNormalizer {
        &self.keys
    }

    #[must_use]
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Canonical collection key for a type name.
    #[must_use]
    pub fn collection_key(&self, entity_type: &str) -> String {
        self.keys.plural_key(entity_type)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("keys", &self.keys)
            .field("schemas", &self.schemas)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`].
#[derive(Default)]
pub struct EngineBuilder {
    inflector: Option<Arc<dyn Inflector>>,
    schemas: Vec<EntitySchema>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl EngineBuilder {
    /// Replaces the default English inflector.
    #[must_use]
    pub fn inflector(mut self, inflector: impl Inflector + 'static) -> Self {
        self.inflector = Some(Arc::new(inflector));
        self
    }

    /// Registers a relationship schema.
    #[must_use]
    pub fn schema(mut self, schema: EntitySchema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Replaces the UUID v7 id generator.
    #[must_use]
    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    #[must_use]
    pub fn build(self) -> Engine {
        let keys = self
            .inflector
            .map_or_else(KeyNormalizer::default, KeyNormalizer::from_arc);
        let mut schemas = SchemaRegistry::new();
        for schema in self.schemas {
            schemas.register(schema, &keys);
        }
        Engine {
            keys,
            schemas,
            ids: self.ids.unwrap_or_else(|| Arc::new(UuidV7Generator)),
        }
    }
}
