//! Operator precedence ranks.

/// Precedence of an expression, used solely to decide whether a
/// sub-expression needs parentheses around its rendering.
///
/// The variants are declared lowest-first so the derived ordering matches
/// the numeric ranks returned by [`Precedence::value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// No statically known precedence; opaque fragments live here.
    Unknown,
    /// `OR`.
    Or,
    /// `AND`.
    And,
    /// `=`, `IN`.
    ComparisonEq,
    /// `<`, `<=`, `>`, `>=`.
    Comparison,
    /// `&`, `|`, `<<`, `>>`.
    Bitwise,
    /// `+`, `-`.
    PlusMinus,
    /// `*`, `/`, `%`.
    MulDivide,
    /// `||`.
    StringConcat,
    /// Unary prefix operators.
    Unary,
    /// Postfix operators such as `IS NULL`.
    Postfix,
    /// Literals, columns, function calls, parenthesized fragments.
    Primary,
}

impl Precedence {
    /// The integer rank; higher binds tighter.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::Unknown => -1,
            Self::Or => 10,
            Self::And => 11,
            Self::ComparisonEq => 12,
            Self::Comparison => 13,
            Self::Bitwise => 14,
            Self::PlusMinus => 15,
            Self::MulDivide => 16,
            Self::StringConcat => 17,
            Self::Unary => 20,
            Self::Postfix => 21,
            Self::Primary => 100,
        }
    }
}
