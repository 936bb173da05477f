//! # weft-sql-core
//!
//! The core of the weft relational-mapping generator: a tokenizer for an
//! extended SQLite-flavored dialect, a typed SQL expression engine with
//! precedence-aware emission, and the schema/query model that links parsed
//! SQL to its generated counterparts.
//!
//! The crate has three entry points:
//!
//! - [`parse_schema`] turns a definition file (`CREATE TABLE` statements
//!   and `label: SELECT …;` named queries) into a [`Schema`] plus
//!   diagnostics. Malformed input never aborts a run.
//! - [`builder::column`] and friends build [`TypedExpr`] trees whose value
//!   types the compiler checks.
//! - [`render`] walks an expression into SQL text and an ordered parameter
//!   vector, parenthesizing sub-expressions only where precedence demands.
//!
//! ## Parsing a definition file
//!
//! ```rust
//! use weft_sql_core::parse_schema;
//!
//! let result = parse_schema(
//!     "CREATE TABLE config (config_key TEXT PRIMARY KEY, value BLOB);\n\
//!      readMultiple: SELECT * FROM config WHERE config_key IN ? ORDER BY $clause;",
//! );
//! assert!(result.diagnostics.is_empty());
//!
//! let table = result.schema.table("config").unwrap();
//! assert_eq!(table.mapped_name(), "Config");
//!
//! let query = result.schema.query("readMultiple").unwrap();
//! assert_eq!(query.placeholders().count(), 2);
//! ```
//!
//! ## Building and rendering typed expressions
//!
//! ```rust
//! use weft_sql_core::builder::column;
//!
//! let (sql, params) = column::<String>("config", "config_key").eq("k").render();
//! assert_eq!(sql, "config_key = ?");
//! assert_eq!(params.len(), 1);
//!
//! let active = column::<bool>("jobs", "active");
//! let retries = column::<i64>("jobs", "retries");
//! let (sql, params) = active.eq(true).or(retries.gt(3)).render();
//! assert_eq!(sql, "active = ? OR retries > ?");
//! assert_eq!(params.len(), 2);
//! ```
//!
//! Every bound value travels as a parameter; the SQL text contains exactly
//! one `?` per entry of the returned vector, in order.

pub mod ast;
pub mod builder;
pub mod diagnostics;
pub mod dialect;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod types;

pub use ast::{ComparisonOp, ExprError, Precedence, SqlExpr};
pub use builder::{render, render_with, BoundValue, GenerationContext, TypedExpr};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use parser::{parse_schema, ParseResult};
pub use schema::{NamedQuery, Placeholder, Schema, TableSpec};
pub use types::{SqlType, SqlValue, ToSqlValue};
