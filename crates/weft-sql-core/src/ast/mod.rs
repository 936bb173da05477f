//! Typed expression tree with precedence-aware emission.

mod expr;
mod precedence;

pub use expr::{ComparisonOp, ExprError, SqlExpr};
pub use precedence::Precedence;
