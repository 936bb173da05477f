//! Named queries and their placeholders.

use serde::{Deserialize, Serialize};

use crate::types::SqlType;

/// A labeled statement from a definition file: `label: SELECT …;`.
///
/// The statement body is kept as an ordered list of fragments alternating
/// verbatim SQL and placeholders; the code writer turns each query into a
/// callable with one argument per placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedQuery {
    /// The label before the colon.
    pub label: String,
    /// The statement body.
    pub fragments: Vec<QueryFragment>,
}

impl NamedQuery {
    /// Iterates over the placeholders in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.fragments.iter().filter_map(|f| match f {
            QueryFragment::Placeholder(p) => Some(p),
            QueryFragment::LiteralSql(_) => None,
        })
    }

    /// Reconstructs the statement with every placeholder in its canonical
    /// spelling. Useful for debugging and stable snapshots.
    #[must_use]
    pub fn sql_template(&self) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                QueryFragment::LiteralSql(sql) => out.push_str(sql),
                QueryFragment::Placeholder(p) => out.push_str(&p.canonical_text()),
            }
        }
        out
    }
}

/// One piece of a named query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryFragment {
    /// Verbatim SQL, forwarded untouched.
    LiteralSql(String),
    /// A hole resolved at call time.
    Placeholder(Placeholder),
}

/// A hole in a named query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Placeholder {
    /// `?` or `?N`: bound by position.
    Positional {
        /// The explicit index of `?N`, if given.
        index: Option<u32>,
    },
    /// `$name`: a single bound value.
    Value {
        /// The placeholder name.
        name: String,
        /// The slot type, when the surrounding SQL pins it down.
        expected_type: Option<SqlType>,
    },
    /// `IN ?` / `IN $name`: expands to `(?, ?, …, ?)` at call time.
    InList {
        /// The placeholder name; `None` for the bare `IN ?` form.
        name: Option<String>,
    },
    /// A caller-supplied rendered SQL fragment.
    DynamicClause {
        /// The placeholder name.
        name: String,
        /// What kind of fragment the caller must supply.
        kind: DynamicClauseKind,
    },
}

impl Placeholder {
    /// The placeholder name, for the named forms.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Positional { .. } => None,
            Self::Value { name, .. } | Self::DynamicClause { name, .. } => Some(name),
            Self::InList { name } => name.as_deref(),
        }
    }

    /// The canonical source spelling.
    #[must_use]
    pub fn canonical_text(&self) -> String {
        match self {
            Self::Positional { index: Some(n) } => format!("?{n}"),
            Self::Positional { index: None } | Self::InList { name: None } => String::from("?"),
            Self::Value { name, .. }
            | Self::InList { name: Some(name) }
            | Self::DynamicClause { name, .. } => format!("${name}"),
        }
    }
}

/// The two kinds of dynamic clause.
///
/// The supplied fragment is opaque to the core; `NULLS FIRST`/`NULLS LAST`
/// tails and the like pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamicClauseKind {
    /// A boolean predicate spliced into a `WHERE`-like position.
    Predicate,
    /// An `ORDER BY` tail.
    OrderBy,
}
