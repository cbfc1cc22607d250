//! Field conversion.
//!
//! Adapts caller-supplied [`Scalar`]s to the typed columns of a table before
//! they are bound, so that a text `"42"` reaches an `integer` column as an
//! `i32` and a text `"1990-05-17"` reaches a `date` column as a `NaiveDate`.

use super::{ColumnDef, ColumnType};
use crate::query::Scalar;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_query::Value;
use std::fmt;

/// A value that does not fit its column, or a column the table lacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub column: String,
    pub reason: String,
}

impl ConversionError {
    pub fn new(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column \"{}\": {}", self.column, self.reason)
    }
}

impl std::error::Error for ConversionError {}

/// Convert every `(column, value)` pair against `columns`, preserving order.
///
/// # Errors
///
/// Fails on the first column missing from `columns` or value that cannot be
/// represented in its column's type.
pub fn convert_fields<'a, I>(columns: &[ColumnDef], fields: I) -> Result<Vec<Value>, ConversionError>
where
    I: IntoIterator<Item = (&'a str, &'a Scalar)>,
{
    fields
        .into_iter()
        .map(|(name, value)| {
            let column = columns
                .iter()
                .find(|column| column.name == name)
                .ok_or_else(|| ConversionError::new(name, "no such column"))?;
            convert_value(column, value)
        })
        .collect()
}

/// Convert a single value to the type of `column`.
pub fn convert_value(column: &ColumnDef, value: &Scalar) -> Result<Value, ConversionError> {
    let mismatch = || {
        ConversionError::new(
            column.name.as_str(),
            format!("cannot convert {value:?} to {}", column.column_type),
        )
    };

    match &column.column_type {
        ColumnType::SmallInt => {
            let i = integer(value).ok_or_else(mismatch)?;
            i16::try_from(i).map(Value::from).map_err(|_| mismatch())
        }
        ColumnType::Integer => {
            let i = integer(value).ok_or_else(mismatch)?;
            i32::try_from(i).map(Value::from).map_err(|_| mismatch())
        }
        ColumnType::BigInt => integer(value).map(Value::from).ok_or_else(mismatch),
        ColumnType::Boolean => boolean(value).map(Value::from).ok_or_else(mismatch),
        ColumnType::Text => Ok(Value::from(value.to_string())),
        ColumnType::Date => match value {
            Scalar::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::from)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        ColumnType::Real => float(value).map(|f| Value::from(f as f32)).ok_or_else(mismatch),
        ColumnType::Double => float(value).map(Value::from).ok_or_else(mismatch),
        ColumnType::Timestamp => match value {
            Scalar::Text(s) => naive_datetime(s).map(Value::from).ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ColumnType::TimestampTz => match value {
            Scalar::Text(s) => utc_datetime(s).map(Value::from).ok_or_else(mismatch),
            _ => Err(mismatch()),
        },
        ColumnType::Json => match value {
            Scalar::Text(s) => serde_json::from_str::<serde_json::Value>(s)
                .map(Value::from)
                .map_err(|e| {
                    ConversionError::new(column.name.as_str(), format!("invalid JSON: {e}"))
                }),
            Scalar::Int(i) => Ok(Value::from(serde_json::Value::from(*i))),
            Scalar::Bool(b) => Ok(Value::from(serde_json::Value::from(*b))),
        },
        ColumnType::Other(name) => Err(ConversionError::new(
            column.name.as_str(),
            format!("unsupported column type {name}"),
        )),
    }
}

fn integer(value: &Scalar) -> Option<i64> {
    match value {
        Scalar::Int(i) => Some(*i),
        Scalar::Text(s) => s.trim().parse().ok(),
        Scalar::Bool(b) => Some(i64::from(*b)),
    }
}

fn boolean(value: &Scalar) -> Option<bool> {
    match value {
        Scalar::Bool(b) => Some(*b),
        Scalar::Int(0) => Some(false),
        Scalar::Int(1) => Some(true),
        Scalar::Int(_) => None,
        Scalar::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "1" | "y" | "yes" | "on" => Some(true),
            "f" | "false" | "0" | "n" | "no" | "off" => Some(false),
            _ => None,
        },
    }
}

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// `YYYY-MM-DD HH:MM:SS[.fff]`, with a space or `T`. A bare date is midnight.
fn naive_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// RFC 3339 or a timestamp with a numeric offset. Without an offset the
/// text is taken as UTC.
fn utc_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z"))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| naive_datetime(text).map(|naive| naive.and_utc()))
}

#[allow(clippy::cast_precision_loss)]
fn float(value: &Scalar) -> Option<f64> {
    match value {
        Scalar::Int(i) => Some(*i as f64),
        Scalar::Text(s) => s.trim().parse().ok(),
        Scalar::Bool(_) => None,
    }
}
