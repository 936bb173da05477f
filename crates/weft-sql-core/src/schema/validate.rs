//! Post-parse schema checks.
//!
//! These run after the whole file has been parsed, so references can point
//! forward. Violations are fatal for code generation but never abort the
//! run; the caller still gets the partial schema.

use super::model::{ForeignKey, Schema, TableSpec};
use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Checks every schema invariant and returns the violations found.
#[must_use]
pub fn validate(schema: &Schema) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    check_duplicate_tables(schema, &mut diagnostics);
    check_duplicate_queries(schema, &mut diagnostics);
    for table in &schema.tables {
        check_duplicate_columns(table, &mut diagnostics);
        check_without_rowid(table, &mut diagnostics);
        for key in table.all_foreign_keys() {
            check_foreign_key(schema, table, &key, &mut diagnostics);
        }
    }

    diagnostics
}

fn check_duplicate_tables(schema: &Schema, diagnostics: &mut Vec<Diagnostic>) {
    for (i, table) in schema.tables.iter().enumerate() {
        let seen_before = schema.tables[..i]
            .iter()
            .any(|earlier| earlier.name.eq_ignore_ascii_case(&table.name));
        if seen_before {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::DuplicateTable(table.name.clone()),
                None,
            ));
        }
    }
}

fn check_duplicate_queries(schema: &Schema, diagnostics: &mut Vec<Diagnostic>) {
    for (i, query) in schema.queries.iter().enumerate() {
        if schema.queries[..i].iter().any(|q| q.label == query.label) {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::DuplicateQuery(query.label.clone()),
                None,
            ));
        }
    }
}

fn check_duplicate_columns(table: &TableSpec, diagnostics: &mut Vec<Diagnostic>) {
    for (i, column) in table.columns.iter().enumerate() {
        let seen_before = table.columns[..i]
            .iter()
            .any(|earlier| earlier.name.eq_ignore_ascii_case(&column.name));
        if seen_before {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::DuplicateColumn(format!("{}.{}", table.name, column.name)),
                None,
            ));
        }
    }
}

fn check_without_rowid(table: &TableSpec, diagnostics: &mut Vec<Diagnostic>) {
    if table.without_rowid && table.primary_key_names().is_empty() {
        diagnostics.push(Diagnostic::critical(
            DiagnosticKind::MissingPrimaryKey(table.name.clone()),
            None,
        ));
    }
}

fn check_foreign_key(
    schema: &Schema,
    table: &TableSpec,
    key: &ForeignKey,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(target) = schema.table(&key.reference.table) else {
        diagnostics.push(Diagnostic::critical(
            DiagnosticKind::UnresolvedReference(format!(
                "table '{}' referenced from '{}' does not exist",
                key.reference.table, table.name
            )),
            None,
        ));
        return;
    };

    // An empty target column list refers to the target's primary key.
    let target_columns = if key.reference.columns.is_empty() {
        target.primary_key_names()
    } else {
        key.reference.columns.clone()
    };

    for column in &target_columns {
        if target.column(column).is_none() {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::UnresolvedReference(format!(
                    "column '{}.{}' referenced from '{}' does not exist",
                    target.name, column, table.name
                )),
                None,
            ));
        }
    }

    if key.columns.len() != target_columns.len() {
        diagnostics.push(Diagnostic::critical(
            DiagnosticKind::UnresolvedReference(format!(
                "foreign key on '{}' names {} columns but references {} on '{}'",
                table.name,
                key.columns.len(),
                target_columns.len(),
                target.name
            )),
            None,
        ));
    }

    for column in &key.columns {
        if table.column(column).is_none() {
            diagnostics.push(Diagnostic::critical(
                DiagnosticKind::UnresolvedReference(format!(
                    "foreign key on '{}' names unknown column '{}'",
                    table.name, column
                )),
                None,
            ));
        }
    }
}
