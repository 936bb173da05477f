//! Named queries and placeholder classification.

mod common;
use common::{parse_clean, parse_dirty};

use weft_sql_core::diagnostics::DiagnosticKind;
use weft_sql_core::schema::{DynamicClauseKind, Placeholder, QueryFragment};
use weft_sql_core::types::SqlType;

const CONFIG: &str = "CREATE TABLE config (config_key TEXT PRIMARY KEY, value BLOB);\n";

#[test]
fn labeled_query_with_in_list_and_dynamic_order_by() {
    let source = format!(
        "{CONFIG}readMultiple: SELECT * FROM config WHERE config_key IN ? ORDER BY $clause;"
    );
    let schema = parse_clean(&source);
    let query = schema.query("readMultiple").unwrap();
    assert_eq!(query.label, "readMultiple");

    let placeholders: Vec<_> = query.placeholders().collect();
    assert_eq!(placeholders.len(), 2);
    assert_eq!(placeholders[0], &Placeholder::InList { name: None });
    assert_eq!(
        placeholders[1],
        &Placeholder::DynamicClause {
            name: String::from("clause"),
            kind: DynamicClauseKind::OrderBy,
        }
    );
}

#[test]
fn fragments_alternate_literal_sql_and_placeholders() {
    let source = format!("{CONFIG}byKey: SELECT * FROM config WHERE config_key = $key;");
    let schema = parse_clean(&source);
    let query = schema.query("byKey").unwrap();

    assert_eq!(query.fragments.len(), 2);
    assert!(matches!(
        &query.fragments[0],
        QueryFragment::LiteralSql(sql) if sql == "SELECT * FROM config WHERE config_key = "
    ));
    assert!(matches!(
        &query.fragments[1],
        QueryFragment::Placeholder(Placeholder::Value { name, .. }) if name == "key"
    ));
}

#[test]
fn value_placeholder_type_is_inferred_from_the_schema() {
    let source = format!("{CONFIG}byKey: SELECT * FROM config WHERE config_key = $key;");
    let schema = parse_clean(&source);
    let query = schema.query("byKey").unwrap();
    assert_eq!(
        query.placeholders().next().unwrap(),
        &Placeholder::Value {
            name: String::from("key"),
            expected_type: Some(SqlType::Text),
        }
    );
}

#[test]
fn value_placeholder_without_schema_context_is_untyped() {
    let schema = parse_clean("lone: SELECT * FROM elsewhere WHERE k = $k;");
    let query = schema.query("lone").unwrap();
    assert_eq!(
        query.placeholders().next().unwrap(),
        &Placeholder::Value {
            name: String::from("k"),
            expected_type: None,
        }
    );
}

#[test]
fn predicate_placeholder_stands_alone_after_where() {
    let source = format!("{CONFIG}search: SELECT * FROM config WHERE $cond AND value IS NOT NULL;");
    let schema = parse_clean(&source);
    let query = schema.query("search").unwrap();
    assert_eq!(
        query.placeholders().next().unwrap(),
        &Placeholder::DynamicClause {
            name: String::from("cond"),
            kind: DynamicClauseKind::Predicate,
        }
    );
}

#[test]
fn named_in_list() {
    let source = format!("{CONFIG}pick: SELECT * FROM config WHERE config_key IN $keys;");
    let schema = parse_clean(&source);
    let query = schema.query("pick").unwrap();
    assert_eq!(
        query.placeholders().next().unwrap(),
        &Placeholder::InList {
            name: Some(String::from("keys"))
        }
    );
}

#[test]
fn explicit_positional_index_is_kept() {
    let source = format!("{CONFIG}pair: SELECT * FROM config WHERE config_key = ?2;");
    let schema = parse_clean(&source);
    let query = schema.query("pair").unwrap();
    assert_eq!(
        query.placeholders().next().unwrap(),
        &Placeholder::Positional { index: Some(2) }
    );
}

#[test]
fn unknown_sql_is_forwarded_verbatim() {
    // The parser only understands enough to find placeholders and the
    // terminating semicolon; everything else passes through untouched.
    let schema = parse_clean(
        "raw: WITH t(n) AS (VALUES (1), (2)) SELECT n * 2 FROM t WHERE n < ?;",
    );
    let query = schema.query("raw").unwrap();
    assert_eq!(
        query.sql_template(),
        "WITH t(n) AS (VALUES (1), (2)) SELECT n * 2 FROM t WHERE n < ?"
    );
}

#[test]
fn placeholder_in_table_position_is_diagnosed() {
    let result = parse_dirty("bad: SELECT * FROM $somewhere;");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(&d.kind, DiagnosticKind::InvalidPlaceholder(name) if name == "somewhere")));
    let query = result.schema.query("bad").unwrap();
    assert_eq!(query.placeholders().count(), 0);
    assert_eq!(query.sql_template(), "SELECT * FROM $somewhere");
}

#[test]
fn duplicate_labels_are_fatal() {
    let result = parse_dirty(
        "one: SELECT 1;\n\
         one: SELECT 2;",
    );
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(&d.kind, DiagnosticKind::DuplicateQuery(label) if label == "one")));
    assert!(result.has_fatal());
}

#[test]
fn unterminated_query_is_diagnosed_but_kept() {
    let result = parse_dirty("tail: SELECT * FROM config WHERE config_key = $key");
    assert!(result
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::UnexpectedToken { .. })));
    let query = result.schema.query("tail").unwrap();
    assert_eq!(query.placeholders().count(), 1);
}
