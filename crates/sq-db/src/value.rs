//! Plain values exchanged with the database.
//!
//! Keeps callers free of a direct `duckdb` dependency.

use std::fmt;

/// A bind parameter or a column value read back from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// SQL NULL
    Null,
    /// Any integer column (read back as i64)
    Integer(i64),
    /// Text column, or any other type coerced to text
    Text(String),
}

impl SqlValue {
    /// Integer value, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "null"),
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Integer(n)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

impl From<&SqlValue> for duckdb::types::Value {
    fn from(value: &SqlValue) -> Self {
        match value {
            SqlValue::Null => duckdb::types::Value::Null,
            SqlValue::Integer(n) => duckdb::types::Value::BigInt(*n),
            SqlValue::Text(s) => duckdb::types::Value::Text(s.clone()),
        }
    }
}

/// Read a column value, trying text first and then integers.
///
/// DuckDB integer columns return `None` for `Option<String>`, so a `None`
/// from the text read is not yet proof of NULL.
pub(crate) fn read_column(row: &duckdb::Row<'_>, idx: usize) -> SqlValue {
    if let Ok(Some(s)) = row.get::<_, Option<String>>(idx) {
        return SqlValue::Text(s);
    }
    if let Ok(Some(n)) = row.get::<_, Option<i64>>(idx) {
        return SqlValue::Integer(n);
    }
    if let Ok(Some(b)) = row.get::<_, Option<bool>>(idx) {
        return SqlValue::Text(b.to_string());
    }
    SqlValue::Null
}
