//! Token types for the SQL tokenizer.

use super::Span;

/// Reserved words of the dialect.
///
/// The set follows the SQLite subset the generator understands, plus the
/// declared-type names that may appear in column definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Queries
    Select,
    From,
    Where,
    Order,
    By,
    Group,
    Having,
    Limit,
    Offset,
    Distinct,
    All,

    // Joins
    Join,
    Inner,
    Left,
    Outer,
    Cross,
    On,
    Using,

    // Set operations
    Union,
    Intersect,
    Except,

    // DML
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,

    // DDL
    Create,
    Table,
    Drop,
    Alter,
    Index,
    View,
    Trigger,

    // Constraints
    Primary,
    Key,
    Foreign,
    References,
    Unique,
    Check,
    Default,
    Constraint,
    Autoincrement,
    Without,
    Rowid,

    // Foreign-key actions
    Cascade,
    Restrict,
    No,
    Action,

    // Operators and predicates
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Is,
    Null,
    True,
    False,
    Exists,

    // Ordering
    Asc,
    Desc,
    Nulls,
    First,
    Last,

    // Expressions
    As,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,

    // Declared type names
    Int,
    Integer,
    Smallint,
    Bigint,
    Real,
    Double,
    Float,
    Numeric,
    Decimal,
    Char,
    Varchar,
    Text,
    Blob,
    Boolean,
    Date,
    Time,
    Datetime,
    Timestamp,
}

impl Keyword {
    /// Attempts to match a keyword case-insensitively.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "ORDER" => Some(Self::Order),
            "BY" => Some(Self::By),
            "GROUP" => Some(Self::Group),
            "HAVING" => Some(Self::Having),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "DISTINCT" => Some(Self::Distinct),
            "ALL" => Some(Self::All),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "ON" => Some(Self::On),
            "USING" => Some(Self::Using),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "CREATE" => Some(Self::Create),
            "TABLE" => Some(Self::Table),
            "DROP" => Some(Self::Drop),
            "ALTER" => Some(Self::Alter),
            "INDEX" => Some(Self::Index),
            "VIEW" => Some(Self::View),
            "TRIGGER" => Some(Self::Trigger),
            "PRIMARY" => Some(Self::Primary),
            "KEY" => Some(Self::Key),
            "FOREIGN" => Some(Self::Foreign),
            "REFERENCES" => Some(Self::References),
            "UNIQUE" => Some(Self::Unique),
            "CHECK" => Some(Self::Check),
            "DEFAULT" => Some(Self::Default),
            "CONSTRAINT" => Some(Self::Constraint),
            "AUTOINCREMENT" => Some(Self::Autoincrement),
            "WITHOUT" => Some(Self::Without),
            "ROWID" => Some(Self::Rowid),
            "CASCADE" => Some(Self::Cascade),
            "RESTRICT" => Some(Self::Restrict),
            "NO" => Some(Self::No),
            "ACTION" => Some(Self::Action),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "IS" => Some(Self::Is),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "EXISTS" => Some(Self::Exists),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "NULLS" => Some(Self::Nulls),
            "FIRST" => Some(Self::First),
            "LAST" => Some(Self::Last),
            "AS" => Some(Self::As),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "CAST" => Some(Self::Cast),
            "INT" => Some(Self::Int),
            "INTEGER" => Some(Self::Integer),
            "SMALLINT" => Some(Self::Smallint),
            "BIGINT" => Some(Self::Bigint),
            "REAL" => Some(Self::Real),
            "DOUBLE" => Some(Self::Double),
            "FLOAT" => Some(Self::Float),
            "NUMERIC" => Some(Self::Numeric),
            "DECIMAL" => Some(Self::Decimal),
            "CHAR" => Some(Self::Char),
            "VARCHAR" => Some(Self::Varchar),
            "TEXT" => Some(Self::Text),
            "BLOB" => Some(Self::Blob),
            "BOOLEAN" => Some(Self::Boolean),
            "DATE" => Some(Self::Date),
            "TIME" => Some(Self::Time),
            "DATETIME" => Some(Self::Datetime),
            "TIMESTAMP" => Some(Self::Timestamp),
            _ => None,
        }
    }

    /// Returns the canonical upper-case spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Group => "GROUP",
            Self::Having => "HAVING",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::On => "ON",
            Self::Using => "USING",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Table => "TABLE",
            Self::Drop => "DROP",
            Self::Alter => "ALTER",
            Self::Index => "INDEX",
            Self::View => "VIEW",
            Self::Trigger => "TRIGGER",
            Self::Primary => "PRIMARY",
            Self::Key => "KEY",
            Self::Foreign => "FOREIGN",
            Self::References => "REFERENCES",
            Self::Unique => "UNIQUE",
            Self::Check => "CHECK",
            Self::Default => "DEFAULT",
            Self::Constraint => "CONSTRAINT",
            Self::Autoincrement => "AUTOINCREMENT",
            Self::Without => "WITHOUT",
            Self::Rowid => "ROWID",
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
            Self::No => "NO",
            Self::Action => "ACTION",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Is => "IS",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Exists => "EXISTS",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Nulls => "NULLS",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::As => "AS",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Cast => "CAST",
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::Smallint => "SMALLINT",
            Self::Bigint => "BIGINT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Float => "FLOAT",
            Self::Numeric => "NUMERIC",
            Self::Decimal => "DECIMAL",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Datetime => "DATETIME",
            Self::Timestamp => "TIMESTAMP",
        }
    }

    /// Returns true if this keyword may open a declared column type.
    #[must_use]
    pub const fn is_type_name(&self) -> bool {
        matches!(
            self,
            Self::Int
                | Self::Integer
                | Self::Smallint
                | Self::Bigint
                | Self::Real
                | Self::Double
                | Self::Float
                | Self::Numeric
                | Self::Decimal
                | Self::Char
                | Self::Varchar
                | Self::Text
                | Self::Blob
                | Self::Boolean
                | Self::Date
                | Self::Time
                | Self::Datetime
                | Self::Timestamp
        )
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Numeric literal, kept in its canonical source form
    /// (decimal, `.5e-3` scientific, or `0x1F` hex).
    Number(String),
    /// String literal `'…'` or binary string literal `x'…'`.
    StringLiteral {
        /// The unescaped content.
        value: String,
        /// True for `x'…'` binary strings.
        binary: bool,
    },
    /// Identifier, plain or `"quoted"` (payload already unescaped).
    Identifier(String),
    /// Reserved word.
    Keyword(Keyword),

    // Punctuation
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// .
    Dot,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// ;
    Semicolon,
    /// :
    Colon,

    /// `?` or `?N` positional placeholder.
    PositionalParam(Option<u32>),
    /// `$name`, `:name` or `@name` placeholder (payload without the sigil).
    NamedParam(String),

    /// End of input.
    Eof,
}

impl TokenKind {
    /// Short human-readable description for diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number `{n}`"),
            Self::StringLiteral { binary: true, .. } => String::from("binary string literal"),
            Self::StringLiteral { .. } => String::from("string literal"),
            Self::Identifier(name) => format!("identifier `{name}`"),
            Self::Keyword(kw) => format!("keyword {}", kw.as_str()),
            Self::LeftParen => String::from("`(`"),
            Self::RightParen => String::from("`)`"),
            Self::Comma => String::from("`,`"),
            Self::Dot => String::from("`.`"),
            Self::Plus => String::from("`+`"),
            Self::Minus => String::from("`-`"),
            Self::Star => String::from("`*`"),
            Self::Slash => String::from("`/`"),
            Self::Lt => String::from("`<`"),
            Self::LtEq => String::from("`<=`"),
            Self::Gt => String::from("`>`"),
            Self::GtEq => String::from("`>=`"),
            Self::Eq => String::from("`=`"),
            Self::NotEq => String::from("`!=`"),
            Self::Semicolon => String::from("`;`"),
            Self::Colon => String::from("`:`"),
            Self::PositionalParam(_) => String::from("positional placeholder"),
            Self::NamedParam(name) => format!("placeholder `${name}`"),
            Self::Eof => String::from("end of input"),
        }
    }
}

/// A token with its span and verbatim lexeme.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte range in the source.
    pub span: Span,
    /// The exact source text the token was read from.
    pub text: String,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span, text: String) -> Self {
        Self { kind, span, text }
    }

    /// Returns true if this is the EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token is the given keyword.
    #[must_use]
    pub fn is_keyword(&self, kw: Keyword) -> bool {
        self.as_keyword() == Some(kw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_str_case_insensitive() {
        assert_eq!(Keyword::from_str("CREATE"), Some(Keyword::Create));
        assert_eq!(Keyword::from_str("create"), Some(Keyword::Create));
        assert_eq!(Keyword::from_str("CrEaTe"), Some(Keyword::Create));
        assert_eq!(Keyword::from_str("config_key"), None);
    }

    #[test]
    fn test_keyword_round_trip() {
        for kw in [Keyword::Without, Keyword::Rowid, Keyword::Autoincrement] {
            assert_eq!(Keyword::from_str(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn test_type_name_keywords() {
        assert!(Keyword::Varchar.is_type_name());
        assert!(Keyword::Datetime.is_type_name());
        assert!(!Keyword::Select.is_type_name());
    }

    #[test]
    fn test_token_helpers() {
        let tok = Token::new(
            TokenKind::Keyword(Keyword::Select),
            Span::new(0, 6),
            String::from("SELECT"),
        );
        assert!(tok.is_keyword(Keyword::Select));
        assert!(!tok.is_keyword(Keyword::From));
        assert!(!tok.is_eof());
        assert_eq!(tok.as_keyword(), Some(Keyword::Select));
    }
}
