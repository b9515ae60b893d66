//! Scalar values and row sets returned by the engine

use std::fmt;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

/// A single scalar produced by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// One result row: column name to value, in engine column order.
///
/// Like an object built from the engine's row entries, a repeated column name
/// keeps its first position and its last value.
pub type Row = IndexMap<String, Value>;

/// Full result of a statement
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    /// Column names as reported by the engine
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Build a row set from column names and positional values
    pub fn from_values(columns: Vec<String>, values: Vec<Vec<Value>>) -> Self {
        let rows = values
            .into_iter()
            .map(|row| columns.iter().cloned().zip(row).collect::<Row>())
            .collect();

        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Column info reported by the engine after a load
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: arrow::datatypes::DataType,
}

/// Summary of a table the engine created from an uploaded file
#[derive(Debug, Clone, Default)]
pub struct TableInfo {
    pub columns: Vec<ColumnInfo>,
    pub row_count: usize,
}
