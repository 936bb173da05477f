//! SQL generation: the emission context and the typed builder layer.

mod context;
mod typed;

pub use context::{BoundValue, GenerationContext};
pub use typed::{
    abs, coalesce, column, custom, length, lower, upper, value, SqlNumeric, SqlValueType,
    TypedExpr,
};

use crate::ast::{Precedence, SqlExpr};

/// Renders an expression with a fresh default context.
///
/// The returned SQL contains exactly one `?` per parameter, in order.
/// Rendering is deterministic: identical inputs yield identical output.
#[must_use]
pub fn render(expr: &SqlExpr) -> (String, Vec<BoundValue>) {
    render_with(expr, GenerationContext::new())
}

/// Renders an expression into the given context.
#[must_use]
pub fn render_with(expr: &SqlExpr, mut ctx: GenerationContext) -> (String, Vec<BoundValue>) {
    expr.write_with(&mut ctx, Precedence::Unknown);
    ctx.finalize()
}
