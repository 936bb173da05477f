//! Compile-time typed layer over the expression tree.
//!
//! [`TypedExpr<T>`] carries the Rust value type of the expression as a
//! phantom parameter, so comparisons, `IN` lists and arithmetic only
//! compile between matching types. Because the types align by
//! construction, this layer never produces a runtime
//! [`ExprError`](crate::ast::ExprError).

use core::marker::PhantomData;

use chrono::{DateTime, Utc};

use super::{render, BoundValue};
use crate::ast::{ComparisonOp, Precedence, SqlExpr};
use crate::types::{SqlType, SqlValue};

/// A Rust type with a fixed place in the SQL-type lattice.
pub trait SqlValueType: Sized {
    /// The lattice type values of this kind are stored as.
    const SQL_TYPE: SqlType;

    /// Converts the value for binding.
    fn into_sql_value(self) -> SqlValue;
}

impl SqlValueType for i64 {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn into_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl SqlValueType for f64 {
    const SQL_TYPE: SqlType = SqlType::Real;

    fn into_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl SqlValueType for String {
    const SQL_TYPE: SqlType = SqlType::Text;

    fn into_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl SqlValueType for bool {
    const SQL_TYPE: SqlType = SqlType::Boolean;

    fn into_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl SqlValueType for Vec<u8> {
    const SQL_TYPE: SqlType = SqlType::Blob;

    fn into_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl SqlValueType for DateTime<Utc> {
    const SQL_TYPE: SqlType = SqlType::DateTime;

    fn into_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self)
    }
}

/// Marker for types with SQL arithmetic.
pub trait SqlNumeric: SqlValueType {}

impl SqlNumeric for i64 {}
impl SqlNumeric for f64 {}

/// An expression whose SQL result type is visible to the compiler.
#[derive(Debug, PartialEq)]
pub struct TypedExpr<T> {
    expr: SqlExpr,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedExpr<T> {
    fn clone(&self) -> Self {
        Self::wrap(self.expr.clone())
    }
}

impl<T> TypedExpr<T> {
    /// Tags an untyped expression. The caller vouches for the type.
    #[must_use]
    pub const fn wrap(expr: SqlExpr) -> Self {
        Self {
            expr,
            _marker: PhantomData,
        }
    }

    /// Borrows the underlying expression.
    #[must_use]
    pub const fn as_expr(&self) -> &SqlExpr {
        &self.expr
    }

    /// Unwraps into the underlying expression.
    #[must_use]
    pub fn into_expr(self) -> SqlExpr {
        self.expr
    }

    /// Renders the expression with a fresh default context.
    #[must_use]
    pub fn render(&self) -> (String, Vec<BoundValue>) {
        render(&self.expr)
    }
}

impl<T: SqlValueType> From<T> for TypedExpr<T> {
    fn from(value: T) -> Self {
        Self::wrap(SqlExpr::variable(value.into_sql_value(), T::SQL_TYPE))
    }
}

impl From<&str> for TypedExpr<String> {
    fn from(value: &str) -> Self {
        Self::wrap(SqlExpr::variable(
            SqlValue::Text(String::from(value)),
            SqlType::Text,
        ))
    }
}

impl From<i32> for TypedExpr<i64> {
    fn from(value: i32) -> Self {
        Self::wrap(SqlExpr::variable(
            SqlValue::Int(i64::from(value)),
            SqlType::Integer,
        ))
    }
}

impl<T: SqlValueType> TypedExpr<T> {
    fn compare(self, op: ComparisonOp, other: impl Into<Self>) -> TypedExpr<bool> {
        TypedExpr::wrap(SqlExpr::Comparison {
            left: Box::new(self.expr),
            op,
            right: Box::new(other.into().expr),
        })
    }

    /// `self = other`.
    #[must_use]
    pub fn eq(self, other: impl Into<Self>) -> TypedExpr<bool> {
        self.compare(ComparisonOp::Equal, other)
    }

    /// `self < other`.
    #[must_use]
    pub fn lt(self, other: impl Into<Self>) -> TypedExpr<bool> {
        self.compare(ComparisonOp::Less, other)
    }

    /// `self <= other`.
    #[must_use]
    pub fn lt_eq(self, other: impl Into<Self>) -> TypedExpr<bool> {
        self.compare(ComparisonOp::LessOrEqual, other)
    }

    /// `self > other`.
    #[must_use]
    pub fn gt(self, other: impl Into<Self>) -> TypedExpr<bool> {
        self.compare(ComparisonOp::Greater, other)
    }

    /// `self >= other`.
    #[must_use]
    pub fn gt_eq(self, other: impl Into<Self>) -> TypedExpr<bool> {
        self.compare(ComparisonOp::GreaterOrEqual, other)
    }

    /// `self IN (…)`. An empty iterator is legal and renders a slot that
    /// is never satisfied.
    #[must_use]
    pub fn is_in(self, values: impl IntoIterator<Item = T>) -> TypedExpr<bool> {
        TypedExpr::wrap(SqlExpr::In {
            inner: Box::new(self.expr),
            values: values.into_iter().map(SqlValueType::into_sql_value).collect(),
            negated: false,
        })
    }

    /// `self NOT IN (…)`.
    #[must_use]
    pub fn is_not_in(self, values: impl IntoIterator<Item = T>) -> TypedExpr<bool> {
        TypedExpr::wrap(SqlExpr::In {
            inner: Box::new(self.expr),
            values: values.into_iter().map(SqlValueType::into_sql_value).collect(),
            negated: true,
        })
    }

    /// `self IS NULL`.
    #[must_use]
    pub fn is_null(self) -> TypedExpr<bool> {
        TypedExpr::wrap(SqlExpr::is_null(self.expr))
    }

    /// `self IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(self) -> TypedExpr<bool> {
        TypedExpr::wrap(SqlExpr::is_not_null(self.expr))
    }

    /// `low <= self AND self <= high`.
    #[must_use]
    pub fn between(self, low: impl Into<Self>, high: impl Into<Self>) -> TypedExpr<bool> {
        self.clone().gt_eq(low).and(self.lt_eq(high))
    }

    /// Re-tags the expression with a different value type. Emits no SQL;
    /// only the carried type changes.
    #[must_use]
    pub fn cast<U: SqlValueType>(self) -> TypedExpr<U> {
        TypedExpr::wrap(SqlExpr::cast(self.expr, U::SQL_TYPE))
    }
}

impl TypedExpr<bool> {
    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: impl Into<Self>) -> Self {
        Self::wrap(self.expr.and(other.into().expr))
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: impl Into<Self>) -> Self {
        Self::wrap(self.expr.or(other.into().expr))
    }

    /// `NOT self`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::wrap(SqlExpr::not(self.expr))
    }
}

impl<T: SqlNumeric> TypedExpr<T> {
    fn arithmetic(self, op: &str, precedence: Precedence, other: impl Into<Self>) -> Self {
        Self::wrap(SqlExpr::infix(
            self.expr,
            op,
            other.into().expr,
            precedence,
            T::SQL_TYPE,
        ))
    }

    /// `self + other`.
    #[must_use]
    pub fn add(self, other: impl Into<Self>) -> Self {
        self.arithmetic("+", Precedence::PlusMinus, other)
    }

    /// `self - other`.
    #[must_use]
    pub fn sub(self, other: impl Into<Self>) -> Self {
        self.arithmetic("-", Precedence::PlusMinus, other)
    }

    /// `self * other`.
    #[must_use]
    pub fn mul(self, other: impl Into<Self>) -> Self {
        self.arithmetic("*", Precedence::MulDivide, other)
    }

    /// `self / other`.
    #[must_use]
    pub fn div(self, other: impl Into<Self>) -> Self {
        self.arithmetic("/", Precedence::MulDivide, other)
    }

    /// `-self`.
    #[must_use]
    pub fn neg(self) -> Self {
        Self::wrap(SqlExpr::unary_minus(self.expr))
    }
}

impl TypedExpr<String> {
    /// `self LIKE pattern`.
    #[must_use]
    pub fn like(self, pattern: impl Into<Self>) -> TypedExpr<bool> {
        TypedExpr::wrap(SqlExpr::infix(
            self.expr,
            "LIKE",
            pattern.into().expr,
            Precedence::ComparisonEq,
            SqlType::Boolean,
        ))
    }

    /// `self || other`.
    #[must_use]
    pub fn concat(self, other: impl Into<Self>) -> Self {
        Self::wrap(SqlExpr::infix(
            self.expr,
            "||",
            other.into().expr,
            Precedence::StringConcat,
            SqlType::Text,
        ))
    }
}

/// A typed column reference.
#[must_use]
pub fn column<T: SqlValueType>(
    table: impl Into<String>,
    name: impl Into<String>,
) -> TypedExpr<T> {
    TypedExpr::wrap(SqlExpr::column(table, name, T::SQL_TYPE))
}

/// A typed bound value.
#[must_use]
pub fn value<T: SqlValueType>(value: T) -> TypedExpr<T> {
    TypedExpr::from(value)
}

/// A typed opaque fragment; `?` placeholders in `sql` line up with
/// `params`. Always parenthesized on emission.
#[must_use]
pub fn custom<T: SqlValueType>(sql: impl Into<String>, params: Vec<SqlValue>) -> TypedExpr<T> {
    TypedExpr::wrap(SqlExpr::custom(sql, params))
}

/// `COALESCE(a, b)`.
#[must_use]
pub fn coalesce<T: SqlValueType>(a: TypedExpr<T>, b: TypedExpr<T>) -> TypedExpr<T> {
    TypedExpr::wrap(SqlExpr::function(
        "COALESCE",
        vec![a.into_expr(), b.into_expr()],
        T::SQL_TYPE,
    ))
}

/// `ABS(x)`.
#[must_use]
pub fn abs<T: SqlNumeric>(x: TypedExpr<T>) -> TypedExpr<T> {
    TypedExpr::wrap(SqlExpr::function("ABS", vec![x.into_expr()], T::SQL_TYPE))
}

/// `LOWER(s)`.
#[must_use]
pub fn lower(s: TypedExpr<String>) -> TypedExpr<String> {
    TypedExpr::wrap(SqlExpr::function("LOWER", vec![s.into_expr()], SqlType::Text))
}

/// `UPPER(s)`.
#[must_use]
pub fn upper(s: TypedExpr<String>) -> TypedExpr<String> {
    TypedExpr::wrap(SqlExpr::function("UPPER", vec![s.into_expr()], SqlType::Text))
}

/// `LENGTH(s)`.
#[must_use]
pub fn length(s: TypedExpr<String>) -> TypedExpr<i64> {
    TypedExpr::wrap(SqlExpr::function(
        "LENGTH",
        vec![s.into_expr()],
        SqlType::Integer,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_with_bound_value() {
        let (sql, params) = column::<String>("config", "config_key").eq("k").render();
        assert_eq!(sql, "config_key = ?");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].value, SqlValue::Text(String::from("k")));
        assert_eq!(params[0].ty, SqlType::Text);
    }

    #[test]
    fn test_in_expansion() {
        let (sql, params) = column::<i64>("t", "x").is_in(vec![1, 2, 3]).render();
        assert_eq!(sql, "x IN (?, ?, ?)");
        assert_eq!(
            params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
            vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
        );
    }

    #[test]
    fn test_between_desugars_to_two_comparisons() {
        let (sql, params) = column::<i64>("t", "age").between(18, 65).render();
        assert_eq!(sql, "age >= ? AND age <= ?");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_cast_changes_only_the_type() {
        let cast: TypedExpr<i64> = column::<String>("t", "n").cast();
        let (sql, params) = cast.render();
        assert_eq!(sql, "n");
        assert!(params.is_empty());
    }

    #[test]
    fn test_arithmetic_precedence() {
        let expr = column::<i64>("t", "a")
            .add(column::<i64>("t", "b"))
            .mul(column::<i64>("t", "c"));
        let (sql, _) = expr.render();
        assert_eq!(sql, "(a + b) * c");
    }

    #[test]
    fn test_like_and_concat() {
        let (sql, _) = column::<String>("t", "name")
            .concat(value(String::from("!")))
            .like("%x%")
            .render();
        assert_eq!(sql, "name || ? LIKE ?");
    }

    #[test]
    fn test_function_helpers() {
        let (sql, _) = length(lower(column::<String>("t", "name"))).render();
        assert_eq!(sql, "LENGTH(LOWER(name))");
    }
}
