use normstore_engine::{Engine, EngineError, Store};
use normstore_model::{Cardinality, EntitySchema, RelationshipField};
use normstore_types::{Attributes, Document, EntityId, IdGenerator, RawEntity, ResourceLinkage};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};

fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => panic!("attributes fixture must be an object"),
    }
}

/// Store with article 1 holding comments [A, B] and article 2 holding none.
fn seeded(engine: &Engine) -> Store {
    let doc = Document::many(vec![
        RawEntity::new("article", "1")
            .with_attributes(attrs(json!({ "title": "first" })))
            .with_relationship("comments", ResourceLinkage::many("comment", ["A", "B"])),
        RawEntity::new("article", "2").with_attributes(attrs(json!({ "title": "second" }))),
    ])
    .with_included(vec![RawEntity::new("comment", "A"), RawEntity::new("comment", "B")]);
    engine.normalize_document(&Store::new(), &doc).unwrap()
}

fn comments(engine: &Engine, store: &Store, id: &str) -> Value {
    engine.get_entity(store, "article", id).unwrap()["comments"].clone()
}

// ── update_entity / insert_new_entity ────────────────────────────

#[test]
fn update_entity_merges_attributes() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let next = engine.update_entity(&store, "article", "1", &attrs(json!({ "title": "edited" })));

    let article = engine.get_entity(&next, "article", "1").unwrap();
    assert_eq!(article["title"], "edited");
    assert_eq!(article["comments"], json!(["A", "B"]));
}

#[test]
fn update_entity_does_not_touch_most_recently_loaded() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let next = engine.update_entity(&store, "article", "3", &attrs(json!({ "title": "new" })));

    assert_eq!(
        next.collection("articles").unwrap().most_recently_loaded(),
        Some(vec![EntityId::from("1"), EntityId::from("2")])
    );
    assert_eq!(engine.get_entity(&next, "article", "3").unwrap()["id"], "3");
}

struct Sequential(AtomicU64);

impl IdGenerator for Sequential {
    fn generate(&self) -> EntityId {
        EntityId::new(format!("local-{}", self.0.fetch_add(1, Ordering::Relaxed)))
    }
}

#[test]
fn insert_new_entity_uses_the_injected_generator() {
    let engine = Engine::builder().id_generator(Sequential(AtomicU64::new(1))).build();
    let (store, first) = engine.insert_new_entity(&Store::new(), "note", attrs(json!({ "text": "a" })));
    let (store, second) = engine.insert_new_entity(&store, "note", attrs(json!({ "text": "b" })));

    assert_eq!(first, "local-1");
    assert_eq!(second, "local-2");
    assert_eq!(engine.get_entity(&store, "notes", "local-2").unwrap()["text"], "b");
}

#[test]
fn insert_new_entity_default_ids_are_unique() {
    let engine = Engine::new();
    let (store, a) = engine.insert_new_entity(&Store::new(), "note", Attributes::new());
    let (store, b) = engine.insert_new_entity(&store, "note", Attributes::new());
    assert_ne!(a, b);
    assert_eq!(store.collection("notes").unwrap().len(), 2);
}

// ── add_relationship ─────────────────────────────────────────────

#[test]
fn add_existing_id_moves_it_to_the_end() {
    let engine = Engine::new();
    let store = seeded(&engine);

    let store = engine
        .add_relationship(&store, "article", "1", "comments", &RawEntity::new("comment", "A"))
        .unwrap();
    assert_eq!(comments(&engine, &store, "1"), json!(["B", "A"]));

    let store = engine
        .add_relationship(&store, "article", "1", "comments", &RawEntity::new("comment", "C"))
        .unwrap();
    assert_eq!(comments(&engine, &store, "1"), json!(["B", "A", "C"]));
}

#[test]
fn add_stores_the_related_entity() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let related =
        RawEntity::new("comment", "C").with_attributes(attrs(json!({ "body": "hello" })));

    let store = engine
        .add_relationship(&store, "article", "1", "comment", &related)
        .unwrap();

    assert_eq!(engine.get_entity(&store, "comment", "C").unwrap()["body"], "hello");
    assert_eq!(comments(&engine, &store, "1"), json!(["A", "B", "C"]));
}

#[test]
fn add_to_entity_without_the_relationship_starts_a_list() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let store = engine
        .add_relationship(&store, "article", "2", "comments", &RawEntity::new("comment", "A"))
        .unwrap();
    assert_eq!(comments(&engine, &store, "2"), json!(["A"]));
}

#[test]
fn add_to_missing_owner_is_rejected() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let err = engine
        .add_relationship(&store, "article", "404", "comments", &RawEntity::new("comment", "A"))
        .unwrap_err();

    assert!(matches!(err, EngineError::EntityNotFound { ref entity_type, ref id }
        if entity_type == "articles" && id == "404"));
}

#[test]
fn add_to_a_to_one_value_is_rejected() {
    let engine = Engine::new();
    let doc = Document::single(
        RawEntity::new("article", "1").with_relationship("author", ResourceLinkage::one("person", "9")),
    );
    let store = engine.normalize_document(&Store::new(), &doc).unwrap();

    let err = engine
        .add_relationship(&store, "article", "1", "author", &RawEntity::new("person", "10"))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::CardinalityMismatch { expected: Cardinality::Many, found: Cardinality::One, .. }
    ));
}

#[test]
fn rejected_add_does_not_store_the_related_entity() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let _ = engine.add_relationship(&store, "article", "404", "comments", &RawEntity::new("comment", "Z"));
    assert!(engine.get_entity(&store, "comment", "Z").is_none());
}

// ── remove_relationship ──────────────────────────────────────────

#[test]
fn remove_drops_the_id() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let store = engine.remove_relationship(&store, "article", "1", "comments", "A").unwrap();

    assert_eq!(comments(&engine, &store, "1"), json!(["B"]));
    assert!(engine.get_entity(&store, "comment", "A").is_some());
}

#[test]
fn remove_absent_id_is_a_noop() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let next = engine.remove_relationship(&store, "article", "1", "comments", "Z").unwrap();
    assert_eq!(next, store);

    let next = engine.remove_relationship(&store, "article", "2", "comments", "A").unwrap();
    assert_eq!(next, store);
}

// ── Schema-checked relationships ─────────────────────────────────

fn schematized() -> Engine {
    Engine::builder()
        .schema(
            EntitySchema::new("article")
                .with(RelationshipField::one("author", "person"))
                .with(RelationshipField::many("comments", "comment")),
        )
        .build()
}

#[test]
fn undeclared_relationship_is_rejected() {
    let engine = schematized();
    let store = seeded(&engine);
    let err = engine
        .add_relationship(&store, "article", "1", "tags", &RawEntity::new("tag", "x"))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownRelationship { ref relationship, .. } if relationship == "tags"));
}

#[test]
fn declared_to_one_rejects_list_mutation() {
    let engine = schematized();
    let store = seeded(&engine);
    let err = engine.remove_relationship(&store, "article", "1", "author", "9").unwrap_err();
    assert!(matches!(err, EngineError::CardinalityMismatch { .. }));
}

#[test]
fn declared_to_many_accepts_singular_spelling() {
    let engine = schematized();
    let store = seeded(&engine);
    let store = engine
        .add_relationship(&store, "article", "1", "comment", &RawEntity::new("comment", "C"))
        .unwrap();
    assert_eq!(comments(&engine, &store, "1"), json!(["A", "B", "C"]));
}

// ── Meta ─────────────────────────────────────────────────────────

#[test]
fn entities_meta_key_update_keeps_other_keys() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let store = engine.update_entities_meta(&store, "article", Some("isLoading"), json!(true));
    let meta = &store.collection("articles").unwrap().meta;

    assert_eq!(meta["isLoading"], true);
    assert_eq!(meta["mostRecentlyLoaded"], json!(["1", "2"]));
}

#[test]
fn entities_meta_replacement_keeps_most_recently_loaded() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let store = engine.update_entities_meta(&store, "article", Some("isLoading"), json!(true));
    let store = engine.update_entities_meta(&store, "article", None, json!({ "page": 2 }));

    assert_eq!(
        Value::Object(store.collection("articles").unwrap().meta.clone()),
        json!({ "page": 2, "mostRecentlyLoaded": ["1", "2"] })
    );
}

#[test]
fn entities_meta_replacement_on_fresh_collection_defaults_the_stamp() {
    let engine = Engine::new();
    let store = engine.update_entities_meta(&Store::new(), "tag", None, json!("not an object"));

    assert_eq!(
        Value::Object(store.collection("tags").unwrap().meta.clone()),
        json!({ "mostRecentlyLoaded": [] })
    );
}

#[test]
fn entity_meta_replacement_and_key_update() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let store = engine.update_entity_meta(&store, "article", "1", Some("isSaving"), json!(true));
    let store = engine.update_entity_meta(&store, "article", "1", Some("error"), json!(null));
    assert_eq!(
        Value::Object(store.entity("articles", "1").unwrap().meta.clone()),
        json!({ "isSaving": true, "error": null })
    );

    let store = engine.update_entity_meta(&store, "article", "1", None, json!({ "fresh": 1 }));
    assert_eq!(
        Value::Object(store.entity("articles", "1").unwrap().meta.clone()),
        json!({ "fresh": 1 })
    );
}

#[test]
fn entity_meta_on_missing_id_creates_a_wrapper_without_data() {
    let engine = Engine::new();
    let store = engine.update_entity_meta(&Store::new(), "article", "9", Some("isLoading"), json!(true));
    let stored = store.entity("articles", "9").unwrap();

    assert!(!stored.has_data());
    assert_eq!(stored.meta["isLoading"], true);
}

// ── ensure_placeholder ───────────────────────────────────────────

#[test]
fn placeholder_is_created_with_its_id() {
    let engine = Engine::new();
    let store = engine.ensure_placeholder(&Store::new(), "article", "9");
    assert_eq!(
        Value::Object(engine.get_entity(&store, "article", "9").unwrap().clone()),
        json!({ "id": "9" })
    );
}

#[test]
fn placeholder_keeps_existing_data_and_meta() {
    let engine = Engine::new();
    let store = seeded(&engine);
    assert_eq!(engine.ensure_placeholder(&store, "article", "1"), store);

    let store = engine.update_entity_meta(&Store::new(), "article", "9", Some("isLoading"), json!(true));
    let store = engine.ensure_placeholder(&store, "article", "9");
    let stored = store.entity("articles", "9").unwrap();
    assert_eq!(stored.id(), Some("9"));
    assert_eq!(stored.meta["isLoading"], true);
}

// ── Removal ──────────────────────────────────────────────────────

#[test]
fn remove_entity_empties_exactly_one_id() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let store = engine.remove_entity(&store, "article", "1");

    assert!(engine.get_entity(&store, "article", "1").is_none());
    assert!(engine.get_entity(&store, "article", "2").is_some());
    assert_eq!(
        store.collection("articles").unwrap().most_recently_loaded(),
        Some(vec![EntityId::from("1"), EntityId::from("2")])
    );
}

#[test]
fn remove_from_missing_collection_creates_nothing() {
    let engine = Engine::new();
    let store = seeded(&engine);
    assert_eq!(engine.remove_entity(&store, "tag", "1"), store);
    assert!(!store.contains_collection("tags"));
}

#[test]
fn clear_entity_type_removes_only_that_collection() {
    let engine = Engine::new();
    let store = seeded(&engine);
    let cleared = engine.clear_entity_type(&store, "article");

    assert!(!cleared.contains_collection("articles"));
    assert_eq!(cleared.collection("comments"), store.collection("comments"));
    assert_eq!(engine.clear_entity_type(&cleared, "article"), cleared);
}

// ── Properties ───────────────────────────────────────────────────

mod relationship_properties {
    use super::*;
    use proptest::prelude::*;

    fn id_strategy() -> impl Strategy<Value = String> {
        prop::string::string_regex("[a-e]").unwrap()
    }

    proptest! {
        #[test]
        fn adds_keep_each_id_once_with_the_latest_last(
            adds in prop::collection::vec(id_strategy(), 1..12)
        ) {
            let engine = Engine::new();
            let mut store = engine.ensure_placeholder(&Store::new(), "article", "1");
            for id in &adds {
                store = engine
                    .add_relationship(&store, "article", "1", "comments", &RawEntity::new("comment", id.as_str()))
                    .unwrap();
            }

            // expected: distinct ids ordered by their last occurrence
            let mut expected: Vec<&str> = Vec::new();
            for id in &adds {
                expected.retain(|existing| existing != id);
                expected.push(id);
            }
            prop_assert_eq!(comments(&engine, &store, "1"), json!(expected));
            prop_assert_eq!(adds.last().map(String::as_str), expected.last().copied());
        }

        #[test]
        fn removing_every_added_id_empties_the_list(
            adds in prop::collection::vec(id_strategy(), 1..8)
        ) {
            let engine = Engine::new();
            let mut store = engine.ensure_placeholder(&Store::new(), "article", "1");
            for id in &adds {
                store = engine
                    .add_relationship(&store, "article", "1", "comments", &RawEntity::new("comment", id.as_str()))
                    .unwrap();
            }
            for id in &adds {
                store = engine.remove_relationship(&store, "article", "1", "comments", id).unwrap();
            }
            prop_assert_eq!(comments(&engine, &store, "1"), json!([]));
        }
    }
}

#[test]
fn snapshots_can_cross_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Store>();
    assert_send_sync::<Engine>();

    let engine = Engine::new();
    let store = seeded(&engine);
    let reader = {
        let store = store.clone();
        std::thread::spawn(move || store.collection("articles").map(|c| c.len()))
    };
    let _ = engine.clear_entity_type(&store, "article");
    assert_eq!(reader.join().unwrap(), Some(2));
}
