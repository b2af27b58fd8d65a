use normstore_model::{Collection, StoredEntity, MOST_RECENTLY_LOADED};
use normstore_types::EntityId;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn make_entity(data: Value) -> StoredEntity {
    let Value::Object(map) = data else {
        panic!("fixture must be a JSON object");
    };
    StoredEntity::new(map)
}

// ── Construction & fields ────────────────────────────────────────

#[test]
fn new_entity_has_empty_meta() {
    let e = make_entity(json!({"id": "1", "title": "Hello"}));
    assert!(e.meta.is_empty());
    assert_eq!(e.id(), Some("1"));
    assert!(e.has_data());
}

#[test]
fn placeholder_holds_only_id() {
    let e = StoredEntity::placeholder(&EntityId::new("44"));
    assert_eq!(serde_json::to_value(&e).unwrap(), json!({"meta": {}, "data": {"id": "44"}}));
}

#[test]
fn default_entity_has_no_data() {
    let e = StoredEntity::default();
    assert_eq!(e.id(), None);
    assert!(!e.has_data());
}

// ── JSON pointer ─────────────────────────────────────────────────

#[test]
fn pointer_reads_top_level_fields() {
    let e = make_entity(json!({"title": "My Article", "count": 5}));
    assert_eq!(e.pointer("/title"), Some(&json!("My Article")));
    assert_eq!(e.pointer("/count"), Some(&json!(5)));
    assert_eq!(e.pointer("/nonexistent"), None);
}

#[test]
fn pointer_with_nested_path() {
    let e = make_entity(json!({"address": {"city": "Oslo"}}));
    assert_eq!(e.pointer("/address/city"), Some(&json!("Oslo")));
    assert_eq!(e.pointer("/address/zip"), None);
}

#[test]
fn relationship_refs_are_addressable() {
    let e = make_entity(json!({"id": "1", "author": "9", "comments": ["5", "12"]}));
    assert_eq!(e.pointer("/author"), Some(&json!("9")));
    assert_eq!(e.pointer("/comments/0"), Some(&json!("5")));
    assert_eq!(e.pointer("/comments/2"), None);
}

// ── Serialization ────────────────────────────────────────────────

#[test]
fn deserialize_fills_missing_meta() {
    let e: StoredEntity = serde_json::from_str(r#"{"data": {"id": "7"}}"#).unwrap();
    assert!(e.meta.is_empty());
    assert_eq!(e.id(), Some("7"));
}

#[test]
fn clone_is_independent() {
    let e = make_entity(json!({"title": "original"}));
    let mut cloned = e.clone();
    cloned.data.insert("title".into(), json!("modified"));

    assert_eq!(e.data["title"], "original");
    assert_eq!(cloned.data["title"], "modified");
}

// ── Collection ───────────────────────────────────────────────────

#[test]
fn collection_entity_mut_inserts_empty_wrapper() {
    let mut c = Collection::new();
    c.entity_mut(&EntityId::new("1")).meta.insert("isLoading".into(), json!(true));

    let stored = c.get("1").unwrap();
    assert_eq!(stored.meta["isLoading"], true);
    assert!(!stored.has_data());
    assert_eq!(c.len(), 1);
}

#[test]
fn collection_remove_reports_presence() {
    let mut c = Collection::new();
    c.entity_mut(&EntityId::new("1"));
    assert!(c.remove("1"));
    assert!(!c.remove("1"));
    assert!(c.is_empty());
}

#[test]
fn most_recently_loaded_absent_until_set() {
    let mut c = Collection::new();
    assert_eq!(c.most_recently_loaded(), None);

    c.set_most_recently_loaded(&[EntityId::new("3"), EntityId::new("1")]);
    assert_eq!(
        c.most_recently_loaded(),
        Some(vec![EntityId::new("3"), EntityId::new("1")])
    );
    assert_eq!(c.meta[MOST_RECENTLY_LOADED], json!(["3", "1"]));
}

#[test]
fn set_most_recently_loaded_keeps_other_meta() {
    let mut c = Collection::new();
    c.meta.insert("page".into(), json!(2));
    c.set_most_recently_loaded(&[EntityId::new("1")]);
    assert_eq!(c.meta["page"], 2);
}

#[test]
fn collection_serializes_by_id_in_camel_case() {
    let mut c = Collection::new();
    c.entity_mut(&EntityId::new("1"))
        .data
        .insert("id".into(), json!("1"));
    assert_eq!(
        serde_json::to_value(&c).unwrap(),
        json!({"meta": {}, "byId": {"1": {"meta": {}, "data": {"id": "1"}}}})
    );
}
