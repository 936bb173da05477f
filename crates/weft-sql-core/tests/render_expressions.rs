//! End-to-end rendering of typed expressions.

use weft_sql_core::builder::{coalesce, column, custom, value};
use weft_sql_core::types::{SqlType, SqlValue};
use weft_sql_core::{render, render_with, GenerationContext, SqlExpr};

#[test]
fn equality_with_bound_value() {
    let (sql, params) = column::<String>("config", "config_key").eq("k").render();
    assert_eq!(sql, "config_key = ?");
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].value, SqlValue::Text(String::from("k")));
    assert_eq!(params[0].ty, SqlType::Text);
}

#[test]
fn precedence_parenthesization() {
    let a = || column::<bool>("t", "a");
    let b = || column::<bool>("t", "b");
    let c = || column::<bool>("t", "c");

    let (sql, _) = a().or(b()).and(c()).render();
    assert_eq!(sql, "(a OR b) AND c");

    let (sql, _) = a().and(b().or(c())).render();
    assert_eq!(sql, "a AND (b OR c)");

    let (sql, _) = a().and(b()).or(c()).render();
    assert_eq!(sql, "a AND b OR c");
}

#[test]
fn in_expansion() {
    let (sql, params) = column::<i64>("t", "x").is_in([1, 2, 3]).render();
    assert_eq!(sql, "x IN (?, ?, ?)");
    assert_eq!(
        params.into_iter().map(|p| p.value).collect::<Vec<_>>(),
        vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
    );
}

#[test]
fn empty_in_list_keeps_boolean_semantics() {
    let (sql, params) = column::<i64>("t", "x").is_in([]).render();
    assert_eq!(sql, "x IN (NULL)");
    assert!(params.is_empty());

    let (sql, _) = column::<i64>("t", "x").is_not_in([]).render();
    assert_eq!(sql, "x NOT IN (NULL)");
}

#[test]
fn parameter_alignment_across_nested_expressions() {
    let expr = column::<String>("t", "name")
        .eq("a")
        .and(column::<i64>("t", "age").is_in([1, 2]))
        .or(custom::<bool>("length(note) > ?", vec![SqlValue::Int(9)]).eq(true));
    let (sql, params) = expr.render();
    assert_eq!(sql.matches('?').count(), params.len());
    assert_eq!(
        params.into_iter().map(|p| p.value).collect::<Vec<_>>(),
        vec![
            SqlValue::Text(String::from("a")),
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(9),
            SqlValue::Bool(true),
        ]
    );
}

#[test]
fn rendering_is_deterministic() {
    let build = || {
        column::<String>("t", "name")
            .like("%x%")
            .and(column::<i64>("t", "age").between(18, 65))
    };
    assert_eq!(build().render(), build().render());
}

#[test]
fn reserved_word_columns_are_quoted() {
    let (sql, _) = column::<i64>("t", "order").eq(1).render();
    assert_eq!(sql, "\"order\" = ?");
}

#[test]
fn custom_fragments_are_always_parenthesized() {
    let (sql, params) = custom::<bool>("v REGEXP ?", vec![SqlValue::Text(String::from("^a"))])
        .and(column::<bool>("t", "ok"))
        .render();
    assert_eq!(sql, "(v REGEXP ?) AND ok");
    assert_eq!(params.len(), 1);
}

#[test]
fn cast_changes_type_without_sql() {
    let as_int = column::<String>("t", "n").cast::<i64>();
    let (sql, params) = as_int.add(value(1)).render();
    assert_eq!(sql, "n + ?");
    assert_eq!(params.len(), 1);
}

#[test]
fn is_null_and_negation() {
    let (sql, _) = column::<String>("t", "note").is_null().render();
    assert_eq!(sql, "note IS NULL");

    let (sql, _) = column::<String>("t", "note")
        .is_not_null()
        .and(column::<bool>("t", "ok"))
        .not()
        .render();
    assert_eq!(sql, "NOT (note IS NOT NULL AND ok)");
}

#[test]
fn coalesce_renders_as_function_call() {
    let (sql, params) = coalesce(column::<i64>("t", "n"), value(0)).eq(0).render();
    assert_eq!(sql, "COALESCE(n, ?) = ?");
    assert_eq!(params.len(), 2);
}

#[test]
fn qualified_rendering_is_opt_in() {
    let expr = column::<String>("config", "config_key").eq("k").into_expr();

    let (sql, _) = render(&expr);
    assert_eq!(sql, "config_key = ?");

    let ctx = GenerationContext::new().with_qualified_columns(true);
    let (sql, _) = render_with(&expr, ctx);
    assert_eq!(sql, "config.config_key = ?");
}

#[test]
fn untyped_layer_reports_type_mismatches() {
    let err = SqlExpr::compare(
        SqlExpr::bare_column("age", SqlType::Integer),
        weft_sql_core::ComparisonOp::Equal,
        SqlExpr::variable(SqlValue::Text(String::from("x")), SqlType::Text),
    )
    .unwrap_err();
    assert!(matches!(err, weft_sql_core::ExprError::TypeMismatch { .. }));
}
