#![allow(dead_code)]

use weft_sql_core::{parse_schema, ParseResult, Schema};

/// Parses a definition file, panicking on any diagnostic.
pub fn parse_clean(source: &str) -> Schema {
    let result = parse_schema(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for {source:?}:\n{:#?}",
        result.diagnostics
    );
    result.schema
}

/// Parses a definition file, expecting at least one diagnostic.
pub fn parse_dirty(source: &str) -> ParseResult {
    let result = parse_schema(source);
    assert!(
        !result.diagnostics.is_empty(),
        "expected diagnostics for {source:?}"
    );
    result
}
