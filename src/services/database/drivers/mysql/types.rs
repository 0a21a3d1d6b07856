//! MySQL type conversion utilities.
//!
//! This module handles conversion between MySQL-specific types (from SQLx)
//! and the generic `Value` type used by the query service.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySqlColumn, MySqlRow, MySqlSslMode};
use sqlx::{Column, Decode, MySql, Row, Type, TypeInfo, ValueRef};

use crate::config::SslMode;
use crate::services::database::traits::{Cell, Row as TraitRow, Value};

/// Converter for MySQL values to the unified `Value` type.
pub struct MySqlValueConverter;

impl MySqlValueConverter {
    /// Convert a MySQL row to a trait Row.
    pub fn convert_row(mysql_row: &MySqlRow) -> TraitRow {
        let cells = mysql_row
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                let value = Self::extract_value(mysql_row, col, idx);
                Cell::new(col.name(), value)
            })
            .collect();

        TraitRow::new(cells)
    }

    /// Column names of a row, in result order.
    pub fn column_names(columns: &[MySqlColumn]) -> Vec<String> {
        columns.iter().map(|col| col.name().to_string()).collect()
    }

    /// Read a column as text, decoding raw bytes when the server reports a
    /// binary collation.
    pub fn text_at(row: &MySqlRow, index: usize) -> sqlx::Result<String> {
        match row.try_get::<String, _>(index) {
            Ok(text) => Ok(text),
            Err(err) => match row.try_get::<Vec<u8>, _>(index) {
                Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
                Err(_) => Err(err),
            },
        }
    }

    /// Extract a value from a MySQL row at the given column index.
    fn extract_value(row: &MySqlRow, column: &MySqlColumn, index: usize) -> Value {
        match row.try_get_raw(index) {
            Ok(raw) if raw.is_null() => return Value::Null,
            Err(_) => return Value::Null,
            _ => {}
        }

        let type_name = column.type_info().name();
        Self::decode_by_type(row, index, type_name)
            .unwrap_or_else(|| Self::decode_as_string_fallback(row, index, type_name))
    }

    fn try_decode<T>(row: &MySqlRow, index: usize) -> Option<T>
    where
        T: for<'r> Decode<'r, MySql> + Type<MySql>,
    {
        row.try_get::<T, _>(index).ok()
    }

    /// Decode a value based on its MySQL type name.
    fn decode_by_type(row: &MySqlRow, index: usize, type_name: &str) -> Option<Value> {
        match type_name {
            // MySQL reports TINYINT(1) as BOOLEAN
            "BOOLEAN" | "BOOL" => Self::try_decode::<bool>(row, index).map(Value::Bool),

            "TINYINT" => Self::try_decode::<i8>(row, index).map(|v| Value::Int(v.into())),
            "SMALLINT" => Self::try_decode::<i16>(row, index).map(|v| Value::Int(v.into())),
            "MEDIUMINT" | "INT" | "INTEGER" => {
                Self::try_decode::<i32>(row, index).map(|v| Value::Int(v.into()))
            }
            "BIGINT" => Self::try_decode::<i64>(row, index).map(Value::Int),

            "TINYINT UNSIGNED" => {
                Self::try_decode::<u8>(row, index).map(|v| Value::UInt(v.into()))
            }
            "SMALLINT UNSIGNED" => {
                Self::try_decode::<u16>(row, index).map(|v| Value::UInt(v.into()))
            }
            "MEDIUMINT UNSIGNED" | "INT UNSIGNED" | "INTEGER UNSIGNED" => {
                Self::try_decode::<u32>(row, index).map(|v| Value::UInt(v.into()))
            }
            "BIGINT UNSIGNED" => Self::try_decode::<u64>(row, index).map(Value::UInt),

            "FLOAT" => Self::try_decode::<f32>(row, index).map(|v| Value::Float(widen_f32(v))),
            "DOUBLE" | "DOUBLE PRECISION" | "REAL" => {
                Self::try_decode::<f64>(row, index).map(Value::Float)
            }

            // The server sends decimals as text in both protocols
            "DECIMAL" | "NUMERIC" | "DEC" | "FIXED" => row
                .try_get_unchecked::<String, _>(index)
                .ok()
                .map(decimal_value),

            // Unchecked: sqlx only accepts BIT columns that carry the unsigned flag
            "BIT" => row.try_get_unchecked::<u64, _>(index).ok().map(Value::UInt),

            "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => {
                Self::try_decode::<String>(row, index).map(Value::Text)
            }

            // Raw bytes are reinterpreted as text
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                Self::try_decode::<Vec<u8>>(row, index).map(|b| Value::from_bytes(&b))
            }

            "DATE" => Self::try_decode::<NaiveDate>(row, index)
                .map(Value::Date)
                .or_else(|| Self::temporal_text(row, index, false)),
            "TIME" => Self::try_decode::<MySqlTime>(row, index).map(time_value),
            "DATETIME" => Self::try_decode::<NaiveDateTime>(row, index)
                .map(Value::DateTime)
                .or_else(|| Self::temporal_text(row, index, true)),
            "TIMESTAMP" => Self::try_decode::<DateTime<Utc>>(row, index)
                .map(Value::DateTimeTz)
                .or_else(|| Self::temporal_text(row, index, true)),
            "YEAR" => row
                .try_get_unchecked::<u16, _>(index)
                .ok()
                .map(|v| Value::UInt(v.into())),

            "JSON" => Self::try_decode::<serde_json::Value>(row, index).map(Value::Json),

            _ if type_name.starts_with("ENUM") || type_name.starts_with("SET") => {
                Self::try_decode::<String>(row, index).map(Value::Text)
            }

            _ => None,
        }
    }

    /// Dates chrono cannot represent (`0000-00-00`, zero month or day),
    /// rendered from the raw value the way MySQL prints them.
    fn temporal_text(row: &MySqlRow, index: usize, with_time: bool) -> Option<Value> {
        let raw = row.try_get_unchecked::<&[u8], _>(index).ok()?;
        render_temporal_bytes(raw, with_time).map(Value::Text)
    }

    /// Fallback for type names the typed decode does not know (spatial
    /// types, `VECTOR`, and so on): their payload is passed through as text.
    fn decode_as_string_fallback(row: &MySqlRow, index: usize, type_name: &str) -> Value {
        if let Ok(s) = row.try_get::<String, _>(index) {
            return Value::Text(s);
        }

        match row.try_get_unchecked::<Vec<u8>, _>(index) {
            Ok(bytes) => Value::from_bytes(&bytes),
            Err(e) => {
                tracing::debug!(
                    "Could not decode column {} of type {}: {}",
                    index,
                    type_name,
                    e
                );
                Value::Null
            }
        }
    }

    /// Map the configured SSL mode to the MySQL driver's SSL mode.
    pub fn map_ssl_mode(mode: SslMode) -> MySqlSslMode {
        match mode {
            SslMode::Disable => MySqlSslMode::Disabled,
            SslMode::Prefer => MySqlSslMode::Preferred,
            SslMode::Require => MySqlSslMode::Required,
            SslMode::VerifyCa => MySqlSslMode::VerifyCa,
            SslMode::VerifyFull => MySqlSslMode::VerifyIdentity,
        }
    }
}

/// `DECIMAL` text as a `Decimal` when it fits without rounding, otherwise
/// the text unchanged (`DECIMAL(65, 30)` holds more digits than `Decimal`).
fn decimal_value(text: String) -> Value {
    match Decimal::from_str_exact(&text) {
        Ok(d) => Value::Decimal(d),
        Err(_) => Value::Text(text),
    }
}

/// Widen through the shortest decimal form so `0.1f32` stays `0.1`.
fn widen_f32(v: f32) -> f64 {
    v.to_string().parse().unwrap_or_else(|_| f64::from(v))
}

/// `TIME` as a time of day when it is one, otherwise the MySQL text form
/// (negative or past 24 hours, up to `838:59:59`).
fn time_value(time: MySqlTime) -> Value {
    if time.is_valid_time_of_day() {
        if let Ok(t) = NaiveTime::try_from(time) {
            return Value::Time(t);
        }
    }

    let sign = if time.is_negative() { "-" } else { "" };
    let mut text = format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        time.hours(),
        time.minutes(),
        time.seconds()
    );
    if time.microseconds() != 0 {
        text.push_str(&format!(".{:06}", time.microseconds()));
    }
    Value::Text(text)
}

/// Render a raw `DATE`/`DATETIME`/`TIMESTAMP` value as MySQL text.
///
/// Binary protocol values start with a length byte (0, 4, 7 or 11) followed
/// by little-endian year, month, day, then hour, minute, second and
/// microseconds. Text protocol values are already in printed form.
fn render_temporal_bytes(raw: &[u8], with_time: bool) -> Option<String> {
    if raw.first().is_some_and(u8::is_ascii_digit) {
        return std::str::from_utf8(raw).ok().map(str::to_string);
    }

    let (&len, rest) = raw.split_first()?;
    let fields = rest.get(..usize::from(len))?;
    let byte = |i: usize| fields.get(i).copied().unwrap_or(0);

    let year = u16::from_le_bytes([byte(0), byte(1)]);
    let mut text = format!("{:04}-{:02}-{:02}", year, byte(2), byte(3));
    if with_time {
        text.push_str(&format!(" {:02}:{:02}:{:02}", byte(4), byte(5), byte(6)));
        let micros = u32::from_le_bytes([byte(7), byte(8), byte(9), byte(10)]);
        if micros != 0 {
            text.push_str(&format!(".{:06}", micros));
        }
    }
    Some(text)
}
