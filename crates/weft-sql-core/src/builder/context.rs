//! The accumulator threaded through expression emission.

use crate::dialect::{Dialect, SqliteDialect};
use crate::types::{MillisecondSerializer, SqlType, SqlValue, ValueSerializer};

/// A parameter bound during emission, paired with its declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundValue {
    /// The value, after the context's serializer was applied.
    pub value: SqlValue,
    /// The declared storage type of the slot.
    pub ty: SqlType,
}

/// Collects the SQL text and the ordered parameter vector of one render.
///
/// Created per render and consumed by [`GenerationContext::finalize`].
/// Parameters are appended in emission order, so the `?` placeholders in
/// the buffer are positionally aligned with the vector by construction.
pub struct GenerationContext {
    buffer: String,
    params: Vec<BoundValue>,
    dialect: Box<dyn Dialect>,
    serializer: Box<dyn ValueSerializer>,
    qualify_columns: bool,
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationContext {
    /// A context for the native dialect with the default datetime codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            params: Vec::new(),
            dialect: Box::new(SqliteDialect::new()),
            serializer: Box::new(MillisecondSerializer),
            qualify_columns: false,
        }
    }

    /// Replaces the dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Box::new(dialect);
        self
    }

    /// Replaces the datetime codec.
    #[must_use]
    pub fn with_serializer(mut self, serializer: impl ValueSerializer + 'static) -> Self {
        self.serializer = Box::new(serializer);
        self
    }

    /// Turns `table.column` qualification on or off (off by default).
    #[must_use]
    pub fn with_qualified_columns(mut self, qualify: bool) -> Self {
        self.qualify_columns = qualify;
        self
    }

    /// Whether column references include their table qualifier.
    #[must_use]
    pub fn qualifies_columns(&self) -> bool {
        self.qualify_columns
    }

    /// Appends raw text to the buffer.
    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Appends a single space unless the buffer is empty or already ends
    /// in a space or an opening parenthesis.
    pub fn write_whitespace_if_needed(&mut self) {
        if !matches!(self.buffer.chars().last(), None | Some(' ' | '(')) {
            self.buffer.push(' ');
        }
    }

    /// Binds a value to the next parameter slot and returns the 1-based
    /// slot index. The caller writes the matching placeholder.
    pub fn introduce_variable(&mut self, value: SqlValue, ty: SqlType) -> usize {
        let value = self.serializer.serialize(value);
        self.params.push(BoundValue { value, ty });
        self.params.len()
    }

    /// Quotes `name` when the dialect requires it (reserved words always).
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        if self.dialect.requires_quoting(name) {
            self.dialect.quote_identifier(name)
        } else {
            String::from(name)
        }
    }

    /// The SQL accumulated so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.buffer
    }

    /// The parameters bound so far.
    #[must_use]
    pub fn params(&self) -> &[BoundValue] {
        &self.params
    }

    /// Consumes the context, yielding the SQL text and its parameters.
    #[must_use]
    pub fn finalize(self) -> (String, Vec<BoundValue>) {
        (self.buffer, self.params)
    }
}
