//! Parsing CREATE TABLE statements and the schema invariants.

mod common;
use common::{parse_clean, parse_dirty};

use weft_sql_core::diagnostics::{DiagnosticKind, Severity};
use weft_sql_core::schema::ForeignKeyAction;
use weft_sql_core::types::SqlType;

#[test]
fn two_tables_with_resolved_foreign_key() {
    let schema = parse_clean(
        "CREATE TABLE with_defaults (a, b UNIQUE);\n\
         CREATE TABLE with_constraints (\n\
           a,\n\
           b NOT NULL,\n\
           c,\n\
           FOREIGN KEY (a, b) REFERENCES with_defaults (a, b)\n\
         );",
    );
    assert_eq!(schema.tables.len(), 2);

    let constrained = schema.table("with_constraints").unwrap();
    assert!(!constrained.columns[1].nullable);
    let keys = constrained.all_foreign_keys();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].columns.len(), 2);
    assert_eq!(keys[0].reference.table, "with_defaults");
    assert_eq!(keys[0].reference.columns.len(), 2);
}

#[test]
fn mapped_class_name_via_as_attribute() {
    let schema = parse_clean(
        "CREATE TABLE config (config_key TEXT PRIMARY KEY) AS \"Setting\";\n\
         CREATE TABLE user_accounts (id INTEGER PRIMARY KEY);",
    );
    let bindings = schema.entity_bindings();
    assert_eq!(bindings[0].class_name, "Setting");
    assert_eq!(bindings[1].class_name, "UserAccount");
}

#[test]
fn without_rowid_requires_primary_key() {
    let result = parse_dirty("CREATE TABLE t (a INTEGER) WITHOUT ROWID;");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::MissingPrimaryKey(_))
            && d.severity == Severity::Critical));
    assert!(result.has_fatal());
    // The partial schema is still available.
    assert!(result.schema.table("t").is_some());
}

#[test]
fn duplicate_tables_and_columns_are_fatal() {
    let result = parse_dirty(
        "CREATE TABLE t (a INTEGER, a TEXT);\n\
         CREATE TABLE T (b INTEGER);",
    );
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::DuplicateColumn(_))));
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::DuplicateTable(_))));
    assert!(result.has_fatal());
}

#[test]
fn unresolved_foreign_key_target() {
    let result = parse_dirty("CREATE TABLE t (a INTEGER REFERENCES missing (id));");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::UnresolvedReference(_))));
}

#[test]
fn foreign_key_actions_round_trip() {
    let schema = parse_clean(
        "CREATE TABLE parents (id INTEGER PRIMARY KEY);\n\
         CREATE TABLE children (\n\
           parent INTEGER REFERENCES parents (id) ON DELETE RESTRICT ON UPDATE NO ACTION\n\
         );",
    );
    let reference = schema.table("children").unwrap().columns[0]
        .references
        .as_ref()
        .unwrap();
    assert_eq!(reference.on_delete, ForeignKeyAction::Restrict);
    assert_eq!(reference.on_update, ForeignKeyAction::NoAction);
    assert_eq!(reference.on_delete.as_sql(), "RESTRICT");
}

#[test]
fn declared_types_map_to_the_lattice() {
    let schema = parse_clean(
        "CREATE TABLE t (\n\
           id BIGINT PRIMARY KEY AUTOINCREMENT,\n\
           name VARCHAR(80),\n\
           ratio DOUBLE,\n\
           body BLOB,\n\
           active BOOLEAN,\n\
           created_at DATETIME\n\
         );",
    );
    let table = schema.table("t").unwrap();
    let types: Vec<_> = table.columns.iter().map(|c| c.sql_type).collect();
    assert_eq!(
        types,
        vec![
            SqlType::Integer,
            SqlType::Text,
            SqlType::Real,
            SqlType::Blob,
            SqlType::Boolean,
            SqlType::DateTime,
        ]
    );
    assert!(table.columns[0].autoincrement);
}

#[test]
fn statements_after_a_bad_one_still_parse() {
    let result = parse_dirty(
        "CREATE VIEW nope AS SELECT 1;\n\
         CREATE TABLE fine (id INTEGER PRIMARY KEY);",
    );
    assert!(result.schema.table("fine").is_some());
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::UnexpectedToken { .. })));
}

#[test]
fn parsing_twice_yields_structurally_equal_schemas() {
    let source = "CREATE TABLE a (x INTEGER, y TEXT DEFAULT 'y');\n\
                  q: SELECT * FROM a WHERE x = $x;";
    let first = parse_clean(source);
    let second = parse_clean(source);
    assert_eq!(first, second);
}
