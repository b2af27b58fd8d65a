use crate::EngineResult;
use normstore_model::{EnglishInflector, EntitySchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Engine configuration, usually read from a JSON file.
///
/// ```json
/// {
///   "irregular": { "cactus": "cacti" },
///   "uncountable": ["firmware"],
///   "schemas": [
///     { "entity_type": "article",
///       "relationships": [ { "name": "author", "cardinality": "one", "target_type": "person" } ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Singular → plural overrides for domain nouns.
    pub irregular: BTreeMap<String, String>,
    /// Words whose plural is the same as the singular.
    pub uncountable: Vec<String>,
    /// Declared relationship schemas.
    pub schemas: Vec<EntitySchema>,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// English inflector extended with this config's vocabulary.
    #[must_use]
    pub fn inflector(&self) -> EnglishInflector {
        let with_irregular = self
            .irregular
            .iter()
            .fold(EnglishInflector::new(), |inf, (singular, plural)| {
                inf.with_irregular(singular, plural)
            });
        self.uncountable
            .iter()
            .fold(with_irregular, |inf, word| inf.with_uncountable(word))
    }
}
