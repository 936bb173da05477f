//! The typed expression tree and its SQL emission.

use super::Precedence;
use crate::builder::GenerationContext;
use crate::types::{SqlType, SqlValue};

/// Error raised when an expression is constructed from incompatible parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// Operands of a comparison or `IN` list disagree on their SQL type.
    #[error("type mismatch: cannot combine {left} with {right}")]
    TypeMismatch {
        /// Type of the left/target operand.
        left: SqlType,
        /// Type of the offending operand.
        right: SqlType,
    },
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// `<`
    Less,
    /// `<=`
    LessOrEqual,
    /// `=`
    Equal,
    /// `>=`
    GreaterOrEqual,
    /// `>`
    Greater,
}

impl ComparisonOp {
    /// The SQL spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Equal => "=",
            Self::GreaterOrEqual => ">=",
            Self::Greater => ">",
        }
    }

    /// Equality ranks below the relational operators.
    #[must_use]
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::Equal => Precedence::ComparisonEq,
            _ => Precedence::Comparison,
        }
    }
}

/// A SQL expression carrying its result type.
///
/// Composite nodes never have precedence [`Precedence::Unknown`]; only
/// [`SqlExpr::Custom`] does, and it parenthesizes itself on emission.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    /// A runtime value bound through a parameter slot.
    Variable {
        /// The value to bind.
        value: SqlValue,
        /// Its storage type.
        ty: SqlType,
    },
    /// An inline literal, written into the SQL verbatim.
    Literal {
        /// The literal SQL text.
        sql: String,
    },
    /// A column reference.
    Column {
        /// Owning table, written only when the context qualifies columns.
        table: Option<String>,
        /// Column name.
        name: String,
        /// Column storage type.
        ty: SqlType,
    },
    /// `name(arg, …)`.
    FunctionCall {
        /// Function name.
        name: String,
        /// Arguments, comma-separated on emission.
        args: Vec<SqlExpr>,
        /// Result type.
        ty: SqlType,
    },
    /// A generic infix operator with an explicit precedence.
    Infix {
        /// Left operand.
        left: Box<SqlExpr>,
        /// Operator text.
        op: String,
        /// Right operand.
        right: Box<SqlExpr>,
        /// Rank used to parenthesize the operands.
        precedence: Precedence,
        /// Result type.
        ty: SqlType,
    },
    /// A comparison; both sides share a type (checked at construction).
    Comparison {
        /// Left operand.
        left: Box<SqlExpr>,
        /// Operator.
        op: ComparisonOp,
        /// Right operand.
        right: Box<SqlExpr>,
    },
    /// `-inner`.
    UnaryMinus {
        /// Operand.
        inner: Box<SqlExpr>,
    },
    /// `NOT inner`.
    Not {
        /// Operand.
        inner: Box<SqlExpr>,
    },
    /// `inner IS [NOT] NULL`.
    IsNull {
        /// Operand.
        inner: Box<SqlExpr>,
        /// True for `IS NOT NULL`.
        negated: bool,
    },
    /// `inner [NOT] IN (…)`; values bind as parameters.
    In {
        /// The tested expression.
        inner: Box<SqlExpr>,
        /// Values, each matching the inner type (checked at construction).
        values: Vec<SqlValue>,
        /// True for `NOT IN`.
        negated: bool,
    },
    /// Type-only cast: changes the carried type, emits nothing.
    Cast {
        /// The wrapped expression.
        inner: Box<SqlExpr>,
        /// The new type tag.
        ty: SqlType,
    },
    /// Opaque SQL, always parenthesized on emission.
    Custom {
        /// The raw fragment; `?` placeholders line up with `params`.
        sql: String,
        /// Parameters referenced by the fragment, in order.
        params: Vec<SqlValue>,
    },
}

impl SqlExpr {
    /// A value bound through a parameter slot.
    #[must_use]
    pub const fn variable(value: SqlValue, ty: SqlType) -> Self {
        Self::Variable { value, ty }
    }

    /// An inline literal.
    #[must_use]
    pub fn literal(sql: impl Into<String>) -> Self {
        Self::Literal { sql: sql.into() }
    }

    /// A column of the given table.
    #[must_use]
    pub fn column(table: impl Into<String>, name: impl Into<String>, ty: SqlType) -> Self {
        Self::Column {
            table: Some(table.into()),
            name: name.into(),
            ty,
        }
    }

    /// A column without a table qualifier.
    #[must_use]
    pub fn bare_column(name: impl Into<String>, ty: SqlType) -> Self {
        Self::Column {
            table: None,
            name: name.into(),
            ty,
        }
    }

    /// A function call.
    #[must_use]
    pub fn function(name: impl Into<String>, args: Vec<SqlExpr>, ty: SqlType) -> Self {
        Self::FunctionCall {
            name: name.into(),
            args,
            ty,
        }
    }

    /// A generic infix operator.
    #[must_use]
    pub fn infix(
        left: SqlExpr,
        op: impl Into<String>,
        right: SqlExpr,
        precedence: Precedence,
        ty: SqlType,
    ) -> Self {
        Self::Infix {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
            precedence,
            ty,
        }
    }

    /// A comparison. Both sides must agree on their SQL type; a side with
    /// no known type (NULL, inline literals, custom fragments) compares
    /// against anything.
    ///
    /// # Errors
    ///
    /// [`ExprError::TypeMismatch`] when both sides carry distinct types.
    pub fn compare(left: SqlExpr, op: ComparisonOp, right: SqlExpr) -> Result<Self, ExprError> {
        if let (Some(l), Some(r)) = (left.sql_type(), right.sql_type()) {
            if l != r {
                return Err(ExprError::TypeMismatch { left: l, right: r });
            }
        }
        Ok(Self::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    /// `inner [NOT] IN (…)`.
    ///
    /// # Errors
    ///
    /// [`ExprError::TypeMismatch`] when a value disagrees with the inner
    /// expression's type.
    pub fn in_list(
        inner: SqlExpr,
        values: Vec<SqlValue>,
        negated: bool,
    ) -> Result<Self, ExprError> {
        if let Some(inner_ty) = inner.sql_type() {
            for value in &values {
                if let Some(value_ty) = value.sql_type() {
                    if value_ty != inner_ty {
                        return Err(ExprError::TypeMismatch {
                            left: inner_ty,
                            right: value_ty,
                        });
                    }
                }
            }
        }
        Ok(Self::In {
            inner: Box::new(inner),
            values,
            negated,
        })
    }

    /// `-inner`.
    #[must_use]
    pub fn unary_minus(inner: SqlExpr) -> Self {
        Self::UnaryMinus {
            inner: Box::new(inner),
        }
    }

    /// `NOT inner`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: SqlExpr) -> Self {
        Self::Not {
            inner: Box::new(inner),
        }
    }

    /// `inner IS NULL`.
    #[must_use]
    pub fn is_null(inner: SqlExpr) -> Self {
        Self::IsNull {
            inner: Box::new(inner),
            negated: false,
        }
    }

    /// `inner IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(inner: SqlExpr) -> Self {
        Self::IsNull {
            inner: Box::new(inner),
            negated: true,
        }
    }

    /// Re-tags the expression with a new type without changing its SQL.
    #[must_use]
    pub fn cast(inner: SqlExpr, ty: SqlType) -> Self {
        Self::Cast {
            inner: Box::new(inner),
            ty,
        }
    }

    /// An opaque fragment with its referenced parameters.
    #[must_use]
    pub fn custom(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self::Custom {
            sql: sql.into(),
            params,
        }
    }

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: SqlExpr) -> Self {
        Self::infix(self, "AND", other, Precedence::And, SqlType::Boolean)
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: SqlExpr) -> Self {
        Self::infix(self, "OR", other, Precedence::Or, SqlType::Boolean)
    }

    /// The intrinsic precedence used by the parenthesization rule.
    #[must_use]
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::Variable { .. }
            | Self::Literal { .. }
            | Self::Column { .. }
            | Self::FunctionCall { .. } => Precedence::Primary,
            Self::Infix { precedence, .. } => *precedence,
            Self::Comparison { op, .. } => op.precedence(),
            Self::UnaryMinus { .. } | Self::Not { .. } => Precedence::Unary,
            Self::IsNull { .. } => Precedence::Postfix,
            Self::In { .. } => Precedence::ComparisonEq,
            Self::Cast { inner, .. } => inner.precedence(),
            Self::Custom { .. } => Precedence::Unknown,
        }
    }

    /// True for inline literals that carry no parameter.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// The result type, where one is statically known.
    #[must_use]
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            Self::Variable { ty, .. }
            | Self::Column { ty, .. }
            | Self::FunctionCall { ty, .. }
            | Self::Infix { ty, .. }
            | Self::Cast { ty, .. } => Some(*ty),
            Self::Comparison { .. } | Self::Not { .. } | Self::IsNull { .. } | Self::In { .. } => {
                Some(SqlType::Boolean)
            }
            Self::UnaryMinus { inner } => inner.sql_type(),
            Self::Literal { .. } | Self::Custom { .. } => None,
        }
    }

    /// Writes the expression, parenthesizing it when its precedence is
    /// below the surrounding one. Opaque fragments are always
    /// parenthesized, even at the top level.
    pub fn write_with(&self, ctx: &mut GenerationContext, outer: Precedence) {
        if self.precedence() < outer || self.is_custom() {
            ctx.write("(");
            self.write_into(ctx);
            ctx.write(")");
        } else {
            self.write_into(ctx);
        }
    }

    /// True for [`SqlExpr::Custom`], looking through type-only casts.
    fn is_custom(&self) -> bool {
        match self {
            Self::Custom { .. } => true,
            Self::Cast { inner, .. } => inner.is_custom(),
            _ => false,
        }
    }

    /// Writes the expression without considering the surroundings. Children
    /// are emitted through [`SqlExpr::write_with`] with this node's
    /// precedence as the outer rank.
    pub fn write_into(&self, ctx: &mut GenerationContext) {
        match self {
            Self::Variable { value, ty } => {
                ctx.introduce_variable(value.clone(), *ty);
                ctx.write("?");
            }
            Self::Literal { sql } => ctx.write(sql),
            Self::Column { table, name, .. } => {
                if ctx.qualifies_columns() {
                    if let Some(table) = table {
                        let quoted = ctx.quote_identifier(table);
                        ctx.write(&quoted);
                        ctx.write(".");
                    }
                }
                let quoted = ctx.quote_identifier(name);
                ctx.write(&quoted);
            }
            Self::FunctionCall { name, args, .. } => {
                ctx.write(name);
                ctx.write("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        ctx.write(", ");
                    }
                    arg.write_with(ctx, Precedence::Unknown);
                }
                ctx.write(")");
            }
            Self::Infix {
                left,
                op,
                right,
                precedence,
                ..
            } => {
                left.write_with(ctx, *precedence);
                ctx.write_whitespace_if_needed();
                ctx.write(op);
                ctx.write(" ");
                right.write_with(ctx, *precedence);
            }
            Self::Comparison { left, op, right } => {
                let precedence = op.precedence();
                left.write_with(ctx, precedence);
                ctx.write_whitespace_if_needed();
                ctx.write(op.as_str());
                ctx.write(" ");
                right.write_with(ctx, precedence);
            }
            Self::UnaryMinus { inner } => {
                ctx.write("-");
                inner.write_with(ctx, Precedence::Unary);
            }
            Self::Not { inner } => {
                ctx.write("NOT ");
                inner.write_with(ctx, Precedence::Unary);
            }
            Self::IsNull { inner, negated } => {
                inner.write_with(ctx, Precedence::Postfix);
                ctx.write(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::In {
                inner,
                values,
                negated,
            } => {
                inner.write_with(ctx, Precedence::ComparisonEq);
                ctx.write(if *negated { " NOT IN (" } else { " IN (" });
                if values.is_empty() {
                    // Keeps the boolean result well-defined for empty lists.
                    ctx.write("NULL");
                } else {
                    for (i, value) in values.iter().enumerate() {
                        if i > 0 {
                            ctx.write(", ");
                        }
                        let ty = value.sql_type().unwrap_or(SqlType::Text);
                        ctx.introduce_variable(value.clone(), ty);
                        ctx.write("?");
                    }
                }
                ctx.write(")");
            }
            Self::Cast { inner, .. } => inner.write_into(ctx),
            Self::Custom { sql, params } => {
                for param in params {
                    let ty = param.sql_type().unwrap_or(SqlType::Text);
                    ctx.introduce_variable(param.clone(), ty);
                }
                ctx.write(sql);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SqlExpr {
        SqlExpr::column("config", "config_key", SqlType::Text)
    }

    #[test]
    fn test_comparison_requires_matching_types() {
        let err = SqlExpr::compare(
            key(),
            ComparisonOp::Equal,
            SqlExpr::variable(SqlValue::Int(3), SqlType::Integer),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ExprError::TypeMismatch {
                left: SqlType::Text,
                right: SqlType::Integer
            }
        );
    }

    #[test]
    fn test_comparison_against_null_is_allowed() {
        let expr = SqlExpr::compare(
            key(),
            ComparisonOp::Equal,
            SqlExpr::variable(SqlValue::Null, SqlType::Text),
        );
        assert!(expr.is_ok());
    }

    #[test]
    fn test_in_list_type_check() {
        let err = SqlExpr::in_list(
            key(),
            vec![SqlValue::Text(String::from("a")), SqlValue::Int(2)],
            false,
        )
        .unwrap_err();
        assert!(matches!(err, ExprError::TypeMismatch { .. }));
    }

    #[test]
    fn test_precedence_per_variant() {
        assert_eq!(key().precedence(), Precedence::Primary);
        assert_eq!(
            SqlExpr::literal("1").and(SqlExpr::literal("2")).precedence(),
            Precedence::And
        );
        assert_eq!(
            SqlExpr::custom("x > ?", vec![SqlValue::Int(1)]).precedence(),
            Precedence::Unknown
        );
        assert_eq!(
            SqlExpr::is_null(key()).precedence(),
            Precedence::Postfix
        );
    }

    #[test]
    fn test_cast_is_transparent_for_precedence() {
        let or = SqlExpr::literal("a").or(SqlExpr::literal("b"));
        let cast = SqlExpr::cast(or.clone(), SqlType::Integer);
        assert_eq!(cast.precedence(), or.precedence());
        assert_eq!(cast.sql_type(), Some(SqlType::Integer));
    }

    #[test]
    fn test_result_types() {
        assert_eq!(
            SqlExpr::compare(key(), ComparisonOp::Less, SqlExpr::literal("'x'"))
                .unwrap()
                .sql_type(),
            Some(SqlType::Boolean)
        );
        assert_eq!(SqlExpr::literal("42").sql_type(), None);
        assert!(SqlExpr::literal("42").is_literal());
        assert!(!key().is_literal());
    }
}
