//! The schema model as consumed by downstream code generation.

mod common;
use common::parse_clean;

use weft_sql_core::schema::{Placeholder, Schema};

const SOURCE: &str = "\
CREATE TABLE categories (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL);
CREATE TABLE todo_entries (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  content TEXT NOT NULL,
  category INTEGER REFERENCES categories (id) ON DELETE CASCADE,
  due_date DATETIME
) AS \"TodoEntry\";
openEntries: SELECT * FROM todo_entries WHERE due_date >= $cutoff ORDER BY $ordering;
";

#[test]
fn entity_bindings_cover_every_table() {
    let schema = parse_clean(SOURCE);
    let bindings = schema.entity_bindings();
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0].table, "categories");
    assert_eq!(bindings[0].class_name, "Category");
    assert_eq!(bindings[1].class_name, "TodoEntry");
}

#[test]
fn model_serializes_and_deserializes() {
    let schema = parse_clean(SOURCE);
    let json = serde_json::to_string(&schema).expect("schema serializes");
    let back: Schema = serde_json::from_str(&json).expect("schema deserializes");
    assert_eq!(schema, back);
}

#[test]
fn query_metadata_survives_the_round_trip() {
    let schema = parse_clean(SOURCE);
    let json = serde_json::to_string(&schema).unwrap();
    let back: Schema = serde_json::from_str(&json).unwrap();

    let query = back.query("openEntries").unwrap();
    let placeholders: Vec<_> = query.placeholders().collect();
    assert_eq!(placeholders.len(), 2);
    assert!(matches!(placeholders[0], Placeholder::Value { name, .. } if name == "cutoff"));
    assert!(matches!(
        placeholders[1],
        Placeholder::DynamicClause { .. }
    ));
}

#[test]
fn lifted_foreign_keys_resolve() {
    let schema = parse_clean(SOURCE);
    let entries = schema.table("todo_entries").unwrap();
    let keys = entries.all_foreign_keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].reference.table, "categories");
    assert_eq!(keys[0].reference.columns, vec![String::from("id")]);
}
