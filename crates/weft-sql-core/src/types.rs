//! The SQL-type lattice and runtime value handling.
//!
//! Every expression node carries a [`SqlType`]; the pair of an in-memory
//! value and its SQL storage type flows through query construction and is
//! checked when comparisons and `IN` lists are built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One SQL storage type of the dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    /// 64-bit integer.
    Integer,
    /// 8-byte IEEE float.
    Real,
    /// UTF-8 text.
    Text,
    /// Raw bytes.
    Blob,
    /// Stored as 0/1 integer.
    Boolean,
    /// Stored as integer milliseconds since the Unix epoch by default; see
    /// [`ValueSerializer`] for the override point.
    DateTime,
}

impl SqlType {
    /// The storage type name used in generated DDL.
    #[must_use]
    pub const fn storage_name(&self) -> &'static str {
        match self {
            Self::Integer | Self::Boolean | Self::DateTime => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }

    /// Maps a declared type name to the lattice using SQLite-style affinity
    /// rules. Parenthesized size arguments are ignored: `VARCHAR(255)` and
    /// `VARCHAR` land on the same type.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        let base = upper.split('(').next().unwrap_or(&upper).trim();
        if base.is_empty() {
            // A column declared without a type.
            Self::Blob
        } else if base.contains("BOOL") {
            Self::Boolean
        } else if base.contains("DATE") || base.contains("TIME") {
            Self::DateTime
        } else if base.contains("INT") {
            Self::Integer
        } else if base.contains("CHAR") || base.contains("CLOB") || base.contains("TEXT") {
            Self::Text
        } else if base.contains("BLOB") {
            Self::Blob
        } else if base.contains("REAL")
            || base.contains("FLOA")
            || base.contains("DOUB")
            || base.contains("DECI")
            || base.contains("NUME")
        {
            Self::Real
        } else {
            Self::Text
        }
    }
}

impl core::fmt::Display for SqlType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A runtime value that can be bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
    /// Point in time.
    DateTime(DateTime<Utc>),
}

impl SqlValue {
    /// The lattice type of this value; `None` for NULL, which compares
    /// against every type.
    #[must_use]
    pub const fn sql_type(&self) -> Option<SqlType> {
        match self {
            Self::Null => None,
            Self::Bool(_) => Some(SqlType::Boolean),
            Self::Int(_) => Some(SqlType::Integer),
            Self::Float(_) => Some(SqlType::Real),
            Self::Text(_) => Some(SqlType::Text),
            Self::Blob(_) => Some(SqlType::Blob),
            Self::DateTime(_) => Some(SqlType::DateTime),
        }
    }

    /// Renders the value as an inline SQL literal using the default codec.
    ///
    /// Parameter binding is preferred; this exists for DEFAULT clauses and
    /// debugging output.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => String::from(if *b { "1" } else { "0" }),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("x'{hex}'")
            }
            Self::DateTime(dt) => format!("{}", dt.timestamp_millis()),
        }
    }
}

/// Conversion of Rust values into [`SqlValue`].
pub trait ToSqlValue {
    /// Converts the value.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::DateTime(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// Strategy for mapping runtime values onto what is actually bound.
///
/// Only datetimes vary between deployments; everything else binds as-is.
pub trait ValueSerializer {
    /// Maps a datetime to its bound representation.
    fn serialize_datetime(&self, dt: &DateTime<Utc>) -> SqlValue;

    /// Applies the strategy to an arbitrary value.
    fn serialize(&self, value: SqlValue) -> SqlValue {
        match value {
            SqlValue::DateTime(dt) => self.serialize_datetime(&dt),
            other => other,
        }
    }
}

/// Default strategy: integer milliseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct MillisecondSerializer;

impl ValueSerializer for MillisecondSerializer {
    fn serialize_datetime(&self, dt: &DateTime<Utc>) -> SqlValue {
        SqlValue::Int(dt.timestamp_millis())
    }
}

/// Alternative strategy: RFC 3339 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Iso8601Serializer;

impl ValueSerializer for Iso8601Serializer {
    fn serialize_datetime(&self, dt: &DateTime<Utc>) -> SqlValue {
        SqlValue::Text(dt.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_affinity_mapping() {
        assert_eq!(SqlType::from_type_name("INTEGER"), SqlType::Integer);
        assert_eq!(SqlType::from_type_name("bigint"), SqlType::Integer);
        assert_eq!(SqlType::from_type_name("VARCHAR(255)"), SqlType::Text);
        assert_eq!(SqlType::from_type_name("BLOB"), SqlType::Blob);
        assert_eq!(SqlType::from_type_name("DOUBLE"), SqlType::Real);
        assert_eq!(SqlType::from_type_name("BOOLEAN"), SqlType::Boolean);
        assert_eq!(SqlType::from_type_name("DATETIME"), SqlType::DateTime);
        assert_eq!(SqlType::from_type_name("TIMESTAMP"), SqlType::DateTime);
        assert_eq!(SqlType::from_type_name(""), SqlType::Blob);
    }

    #[test]
    fn test_storage_names() {
        assert_eq!(SqlType::Boolean.storage_name(), "INTEGER");
        assert_eq!(SqlType::DateTime.storage_name(), "INTEGER");
        assert_eq!(SqlType::Text.storage_name(), "TEXT");
    }

    #[test]
    fn test_inline_text_escaping() {
        assert_eq!(
            SqlValue::Text(String::from("it's")).to_sql_inline(),
            "'it''s'"
        );
    }

    #[test]
    fn test_inline_blob_and_bool() {
        assert_eq!(SqlValue::Blob(vec![0xAB, 0x01]).to_sql_inline(), "x'AB01'");
        assert_eq!(SqlValue::Bool(true).to_sql_inline(), "1");
        assert_eq!(SqlValue::Null.to_sql_inline(), "NULL");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!("k".to_sql_value(), SqlValue::Text(String::from("k")));
        assert_eq!(None::<i64>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(1.5_f64).to_sql_value(), SqlValue::Float(1.5));
    }

    #[test]
    fn test_datetime_serializers() {
        let dt = Utc.timestamp_millis_opt(86_400_000).unwrap();
        assert_eq!(
            MillisecondSerializer.serialize(SqlValue::DateTime(dt)),
            SqlValue::Int(86_400_000)
        );
        assert!(matches!(
            Iso8601Serializer.serialize(SqlValue::DateTime(dt)),
            SqlValue::Text(_)
        ));
        assert_eq!(
            MillisecondSerializer.serialize(SqlValue::Int(7)),
            SqlValue::Int(7)
        );
    }
}
