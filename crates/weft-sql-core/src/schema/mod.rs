//! The schema/query model linking parsed SQL to generated code.

mod model;
pub mod naming;
mod query;
mod validate;

pub use model::{
    ColumnReference, ColumnSpec, EntityBinding, ForeignKey, ForeignKeyAction, Schema, TableSpec,
};
pub use query::{DynamicClauseKind, NamedQuery, Placeholder, QueryFragment};
pub use validate::validate;
