//! Diagnostics collected while parsing and validating schema files.
//!
//! Malformed input never aborts a run: the tokenizer, the parser and the
//! schema checks all push diagnostics and keep going, so one run reports as
//! many problems as possible.

use crate::lexer::{LexError, LexErrorKind, Span};

/// How bad a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Suspicious but harmless.
    Warning,
    /// Wrong, but code generation may still be meaningful.
    Error,
    /// Fatal for code generation; the partial schema is still returned.
    Critical,
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    /// A byte outside every lexical rule.
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    /// EOF inside a string literal.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// The numeric-literal grammar required a digit.
    #[error("expected a digit in numeric literal")]
    ExpectedDigit,
    /// The parser required a specific token and saw another.
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        /// What the grammar required.
        expected: String,
        /// What was actually there.
        found: String,
    },
    /// Two tables share a name (case-insensitive).
    #[error("duplicate table '{0}'")]
    DuplicateTable(String),
    /// Two columns of one table share a name.
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    /// Two named queries share a label.
    #[error("duplicate query '{0}'")]
    DuplicateQuery(String),
    /// A foreign key or mapping points at nothing.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(String),
    /// A `WITHOUT ROWID` table without an explicit primary key.
    #[error("WITHOUT ROWID table '{0}' needs an explicit primary key")]
    MissingPrimaryKey(String),
    /// A `$name` in a position with no defined interpretation.
    #[error("placeholder '${0}' has no defined interpretation here")]
    InvalidPlaceholder(String),
}

/// A single problem, with its location where one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// How bad it is.
    pub severity: Severity,
    /// Source location, where applicable.
    pub span: Option<Span>,
}

impl Diagnostic {
    /// A [`Severity::Warning`] diagnostic.
    #[must_use]
    pub const fn warning(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            span,
        }
    }

    /// A [`Severity::Error`] diagnostic.
    #[must_use]
    pub const fn error(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            span,
        }
    }

    /// A [`Severity::Critical`] diagnostic.
    #[must_use]
    pub const fn critical(kind: DiagnosticKind, span: Option<Span>) -> Self {
        Self {
            kind,
            severity: Severity::Critical,
            span,
        }
    }

    /// True if a consumer must not generate code from this run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Critical
    }
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} at bytes {span}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        let kind = match err.kind {
            LexErrorKind::UnexpectedCharacter(c) => DiagnosticKind::UnexpectedCharacter(c),
            LexErrorKind::UnterminatedString => DiagnosticKind::UnterminatedString,
            LexErrorKind::ExpectedDigit => DiagnosticKind::ExpectedDigit,
        };
        Self::error(kind, Some(err.span))
    }
}
