//! Dynamically-typed row and value types.
//!
//! This module contains:
//! - `Value` - A value read from any column, resolved per column at scan time
//! - `Cell` - A named cell in a result row
//! - `Row` - An ordered mapping of column name to value
//! - `QueryResult` - Column names plus the rows returned by a query

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// A value read from a result column.
///
/// Raw byte columns are decoded to `Text` when the row is scanned, so there is
/// no bytes variant. Serializes untagged: numbers and booleans as JSON
/// primitives, decimals and temporal values as strings, JSON columns nested.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value
    #[default]
    Null,
    /// Boolean value (MySQL `BOOLEAN` / `TINYINT(1)`)
    Bool(bool),
    /// Signed integer of any width
    Int(i64),
    /// Unsigned integer of any width
    UInt(u64),
    /// Floating point
    Float(f64),
    /// Decimal/numeric with arbitrary precision
    Decimal(Decimal),
    /// Text, including byte columns decoded as UTF-8
    Text(String),
    /// Date without time
    Date(NaiveDate),
    /// Time without date
    Time(NaiveTime),
    /// Date and time without timezone
    DateTime(NaiveDateTime),
    /// Date and time with timezone (stored as UTC)
    DateTimeTz(DateTime<Utc>),
    /// JSON value
    Json(serde_json::Value),
}

impl Value {
    /// Decode raw column bytes as text. Invalid UTF-8 sequences are replaced.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Value::Text(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Convert this value to its JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(v) => Json::from(*v),
            Value::UInt(v) => Json::from(*v),
            // Non-finite floats have no JSON form and become null.
            Value::Float(v) => Json::from(*v),
            Value::Decimal(d) => Json::String(d.to_string()),
            Value::Text(s) => Json::String(s.clone()),
            Value::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Value::Time(t) => Json::String(t.format("%H:%M:%S%.f").to_string()),
            Value::DateTime(dt) => Json::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Value::DateTimeTz(dt) => {
                Json::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            Value::Json(j) => j.clone(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// A named cell in a result row
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Column name
    pub column: String,
    /// The value of this cell
    pub value: Value,
}

impl Cell {
    /// Create a new cell
    pub fn new(column: impl Into<String>, value: Value) -> Self {
        Self {
            column: column.into(),
            value,
        }
    }
}

/// An ordered mapping from column name to value.
///
/// Serializes as a JSON object whose keys appear in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// The cells in this row, in column order
    pub cells: Vec<Cell>,
}

impl Row {
    /// Create a new row from cells
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Zip column names with values
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(column, value)| Cell::new(column, value))
                .collect(),
        }
    }

    /// Look up a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|c| c.column == column)
            .map(|c| &c.value)
    }

    /// Iterate over column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|c| c.column.as_str())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for cell in &self.cells {
            map.serialize_entry(&cell.column, &cell.value)?;
        }
        map.end()
    }
}

/// Result of a table read: column names plus rows in database return order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names, in result order
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Create a new query result
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Total row count
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check that every row carries exactly the result columns, in order.
    pub fn rows_match_columns(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.columns().eq(self.columns.iter().map(String::as_str)))
    }
}
