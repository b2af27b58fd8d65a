//! Argument parsing and execution for the `normstore` binary.
//!
//! Kept apart from `main` so the whole pipeline can be driven from tests.

use anyhow::{Context, Result, bail};
use clap::Parser;
use normstore_engine::{Command, Engine, EngineConfig, Relations, Store};
use normstore_types::{Document, EntityId};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{fmt, fs};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "normstore")]
#[command(about = "Normalize JSON:API documents into a flat entity store")]
pub struct Args {
    /// JSON:API documents to load, in order
    pub documents: Vec<PathBuf>,

    /// Engine configuration (inflection overrides, relationship schemas)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON array of commands applied after the documents are loaded
    #[arg(long)]
    pub commands: Option<PathBuf>,

    /// Print entities instead of the store: <type>[:<id>[,<id>...]]
    #[arg(short, long)]
    pub get: Option<Query>,

    /// Relationships to resolve in --get output
    #[arg(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Print one field of each selected entity, as a JSON pointer (e.g. /title)
    #[arg(short, long, requires = "get", conflicts_with = "include")]
    pub field: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What `--get` selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub entity_type: String,
    /// `None` selects the whole collection.
    pub ids: Option<Vec<EntityId>>,
}

impl FromStr for Query {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (entity_type, ids) = match s.split_once(':') {
            Some((entity_type, ids)) => {
                let ids: Vec<EntityId> = ids
                    .split(',')
                    .filter(|id| !id.is_empty())
                    .map(EntityId::from)
                    .collect();
                if ids.is_empty() {
                    return Err(format!("no ids after ':' in {s:?}"));
                }
                (entity_type, Some(ids))
            }
            None => (s, None),
        };
        if entity_type.is_empty() {
            return Err(format!("missing entity type in {s:?}"));
        }
        Ok(Self {
            entity_type: entity_type.to_string(),
            ids,
        })
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entity_type)?;
        if let Some(ids) = &self.ids {
            let ids: Vec<&str> = ids.iter().map(EntityId::as_str).collect();
            write!(f, ":{}", ids.join(","))?;
        }
        Ok(())
    }
}

/// Loads documents, applies commands and renders the requested output.
pub fn run(args: &Args) -> Result<Value> {
    let engine = match &args.config {
        Some(path) => {
            let config = EngineConfig::from_json(&read(path)?)
                .with_context(|| format!("invalid config {}", path.display()))?;
            Engine::from_config(&config)
        }
        None => Engine::new(),
    };
    debug!(?engine, "engine ready");

    let mut store = Store::new();
    for path in &args.documents {
        let document = Document::from_json(&read(path)?)
            .with_context(|| format!("invalid document {}", path.display()))?;
        store = engine
            .normalize_document(&store, &document)
            .with_context(|| format!("cannot normalize {}", path.display()))?;
        info!(path = %path.display(), collections = store.len(), "loaded document");
    }

    if let Some(path) = &args.commands {
        let commands: Vec<Command> = serde_json::from_str(&read(path)?)
            .with_context(|| format!("invalid commands {}", path.display()))?;
        store = engine
            .apply_all(&store, &commands)
            .with_context(|| format!("command batch {} rejected", path.display()))?;
        info!(count = commands.len(), "applied commands");
    }

    match &args.get {
        Some(query) => Ok(match &args.field {
            Some(pointer) => select_field(&engine, &store, query, pointer),
            None => select(&engine, &store, query, &args.include),
        }),
        None => {
            if !args.include.is_empty() {
                bail!("--include requires --get");
            }
            Ok(store.to_value()?)
        }
    }
}

fn select(engine: &Engine, store: &Store, query: &Query, include: &[String]) -> Value {
    let relations = Relations::from(include.iter().map(String::as_str).collect::<Vec<_>>());
    match query.ids.as_deref() {
        Some([id]) => engine
            .get_entity_with_relationships(store, &query.entity_type, id.as_str(), relations)
            .map_or(Value::Null, Value::Object),
        ids => Value::Array(
            engine
                .get_entities_with_relationships(store, &query.entity_type, ids, relations)
                .into_iter()
                .map(Value::Object)
                .collect(),
        ),
    }
}

/// Field values in query order; `null` where the entity or the field is missing.
fn select_field(engine: &Engine, store: &Store, query: &Query, pointer: &str) -> Value {
    let field = |id: &str| {
        engine
            .get_field(store, &query.entity_type, id, pointer)
            .cloned()
            .unwrap_or(Value::Null)
    };
    match query.ids.as_deref() {
        Some([id]) => field(id.as_str()),
        Some(ids) => ids.iter().map(|id| field(id.as_str())).collect(),
        None => engine
            .get_entities(store, &query.entity_type, None)
            .into_iter()
            .filter_map(|data| data.get("id").and_then(Value::as_str))
            .map(field)
            .collect(),
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}
