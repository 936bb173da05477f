//! The in-memory schema model produced by the SQL-file parser.

use serde::{Deserialize, Serialize};

use super::naming;
use super::query::NamedQuery;
use crate::types::SqlType;

/// Everything one definition file describes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Tables, in declaration order.
    pub tables: Vec<TableSpec>,
    /// Named queries, in declaration order.
    pub queries: Vec<NamedQuery>,
}

impl Schema {
    /// Looks up a table by name, case-insensitively.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a named query by its label.
    #[must_use]
    pub fn query(&self, label: &str) -> Option<&NamedQuery> {
        self.queries.iter().find(|q| q.label == label)
    }

    /// The table-to-class bindings consumed by the code writer.
    #[must_use]
    pub fn entity_bindings(&self) -> Vec<EntityBinding> {
        self.tables
            .iter()
            .map(|t| EntityBinding {
                table: t.name.clone(),
                class_name: t.mapped_name(),
            })
            .collect()
    }
}

/// Links a table to the class name generated for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBinding {
    /// The table name.
    pub table: String,
    /// The mapped class name: chosen via `AS "Name"`, or derived.
    pub class_name: String,
}

/// One `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name as written.
    pub name: String,
    /// Columns, ordered; names unique within the table.
    pub columns: Vec<ColumnSpec>,
    /// Columns of a table-level `PRIMARY KEY (…)` constraint. Empty when
    /// the key is declared on a column or the table rides the rowid.
    pub primary_key: Vec<String>,
    /// Column groups of table-level `UNIQUE (…)` constraints.
    pub unique_constraints: Vec<Vec<String>>,
    /// True for `WITHOUT ROWID` tables.
    pub without_rowid: bool,
    /// Table-level foreign keys.
    pub foreign_keys: Vec<ForeignKey>,
    /// Class name attached via `AS "Name"`.
    pub mapped_class_name: Option<String>,
}

impl TableSpec {
    /// Creates an empty table specification.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            without_rowid: false,
            foreign_keys: Vec::new(),
            mapped_class_name: None,
        }
    }

    /// Looks up a column by name, case-insensitively.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// The primary-key column names: the table-level constraint when
    /// present, otherwise the columns flagged `PRIMARY KEY`. Empty means
    /// the implicit rowid.
    #[must_use]
    pub fn primary_key_names(&self) -> Vec<String> {
        if !self.primary_key.is_empty() {
            return self.primary_key.clone();
        }
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.clone())
            .collect()
    }

    /// The class name downstream code generation uses for this table.
    #[must_use]
    pub fn mapped_name(&self) -> String {
        match &self.mapped_class_name {
            Some(name) => name.clone(),
            None => naming::derived_class_name(&self.name),
        }
    }

    /// All foreign keys, table-level ones first, then column-level
    /// `REFERENCES` clauses lifted into the same shape.
    #[must_use]
    pub fn all_foreign_keys(&self) -> Vec<ForeignKey> {
        let mut keys = self.foreign_keys.clone();
        for column in &self.columns {
            if let Some(reference) = &column.references {
                keys.push(ForeignKey {
                    columns: vec![column.name.clone()],
                    reference: reference.clone(),
                });
            }
        }
        keys
    }
}

/// One column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name as written.
    pub name: String,
    /// The declared type, preserved textually (`VARCHAR(255)`).
    pub declared_type: String,
    /// The lattice type the declared type maps to.
    pub sql_type: SqlType,
    /// False when `NOT NULL` or part of a primary key.
    pub nullable: bool,
    /// The `DEFAULT` expression, preserved textually.
    pub default: Option<String>,
    /// True for a column-level `PRIMARY KEY`.
    pub primary_key: bool,
    /// True for `AUTOINCREMENT`.
    pub autoincrement: bool,
    /// True for a column-level `UNIQUE`.
    pub unique: bool,
    /// A column-level `REFERENCES` clause.
    pub references: Option<ColumnReference>,
}

impl ColumnSpec {
    /// Creates a nullable column of the given declared type.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        let declared_type = declared_type.into();
        let sql_type = SqlType::from_type_name(&declared_type);
        Self {
            name: name.into(),
            declared_type,
            sql_type,
            nullable: true,
            default: None,
            primary_key: false,
            autoincrement: false,
            unique: false,
            references: None,
        }
    }

    /// Marks the column `NOT NULL`.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Marks the column as the primary key. Primary keys are not nullable.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Marks the column `UNIQUE`.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the `DEFAULT` expression text.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Attaches a `REFERENCES` clause.
    #[must_use]
    pub fn references(mut self, reference: ColumnReference) -> Self {
        self.references = Some(reference);
        self
    }
}

/// The target of a foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReference {
    /// Referenced table.
    pub table: String,
    /// Referenced columns; empty means the target's primary key.
    pub columns: Vec<String>,
    /// `ON DELETE` action.
    pub on_delete: ForeignKeyAction,
    /// `ON UPDATE` action.
    pub on_update: ForeignKeyAction,
}

impl ColumnReference {
    /// References the primary key of `table`.
    #[must_use]
    pub fn to_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }

    /// References explicit columns of `table`.
    #[must_use]
    pub fn to_columns(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            columns,
            on_delete: ForeignKeyAction::NoAction,
            on_update: ForeignKeyAction::NoAction,
        }
    }
}

/// A table-level foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Local columns.
    pub columns: Vec<String>,
    /// The referenced side.
    pub reference: ColumnReference,
}

/// What happens to referencing rows on delete/update of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ForeignKeyAction {
    /// No action.
    #[default]
    NoAction,
    /// Restrict.
    Restrict,
    /// Cascade.
    Cascade,
    /// Set the referencing columns to NULL.
    SetNull,
    /// Set the referencing columns to their defaults.
    SetDefault,
}

impl ForeignKeyAction {
    /// The SQL spelling.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_builder() {
        let col = ColumnSpec::new("id", "INTEGER").primary_key();
        assert_eq!(col.sql_type, SqlType::Integer);
        assert!(col.primary_key);
        assert!(!col.nullable);
    }

    #[test]
    fn test_mapped_name_prefers_as_clause() {
        let mut table = TableSpec::new("config");
        assert_eq!(table.mapped_name(), "Config");
        table.mapped_class_name = Some(String::from("Setting"));
        assert_eq!(table.mapped_name(), "Setting");
    }

    #[test]
    fn test_primary_key_names_fall_back_to_column_flags() {
        let mut table = TableSpec::new("t");
        table.columns.push(ColumnSpec::new("a", "INTEGER").primary_key());
        assert_eq!(table.primary_key_names(), vec![String::from("a")]);

        table.primary_key = vec![String::from("a"), String::from("b")];
        assert_eq!(table.primary_key_names().len(), 2);
    }

    #[test]
    fn test_column_level_references_are_lifted() {
        let mut table = TableSpec::new("posts");
        table.columns.push(
            ColumnSpec::new("author", "INTEGER").references(ColumnReference::to_table("users")),
        );
        let keys = table.all_foreign_keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].columns, vec![String::from("author")]);
        assert_eq!(keys[0].reference.table, "users");
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut schema = Schema::default();
        schema.tables.push(TableSpec::new("Users"));
        assert!(schema.table("users").is_some());
        assert!(schema.table("missing").is_none());
    }
}
