//! Value conversion utilities for SeaQuery to may_postgres.
//!
//! This module converts SeaQuery `Value` enums into `ToSql` trait objects that
//! can be used with `may_postgres` queries.
//!
//! The conversion follows a two-step pattern:
//! 1. collect every value into an owned, typed parameter
//! 2. borrow each owned parameter as `&dyn ToSql`
//!
//! This keeps the references valid for the whole closure scope. NULLs keep
//! their column type (`Option<i16>`, `Option<NaiveDate>`, ...) so the server
//! accepts them for typed placeholders.

use crate::store::StoreError;
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use may_postgres::types::{IsNull, ToSql, Type};
use sea_query::{Value, Values};
use std::error::Error;

enum OwnedParam {
    Bool(Option<bool>),
    SmallInt(Option<i16>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Float(Option<f32>),
    Double(Option<f64>),
    Text(Option<String>),
    Bytes(Option<Vec<u8>>),
    Date(Option<NaiveDate>),
    Timestamp(Option<NaiveDateTime>),
    TimestampTz(Option<DateTime<Utc>>),
    Json(Option<JsonParam>),
}

impl OwnedParam {
    fn from_value(value: &Value) -> Result<Self, StoreError> {
        let param = match value {
            Value::Bool(v) => OwnedParam::Bool(*v),
            Value::TinyInt(v) => OwnedParam::SmallInt(v.map(i16::from)),
            Value::SmallInt(v) => OwnedParam::SmallInt(*v),
            Value::Int(v) => OwnedParam::Int(*v),
            Value::BigInt(v) => OwnedParam::BigInt(*v),
            Value::TinyUnsigned(v) => OwnedParam::SmallInt(v.map(i16::from)),
            Value::SmallUnsigned(v) => OwnedParam::Int(v.map(i32::from)),
            Value::Unsigned(v) => OwnedParam::BigInt(v.map(i64::from)),
            Value::BigUnsigned(Some(u)) => {
                let i = i64::try_from(*u).map_err(|_| {
                    StoreError::UnsupportedValue(format!(
                        "BigUnsigned value {u} exceeds i64::MAX ({}), cannot be safely cast to i64",
                        i64::MAX
                    ))
                })?;
                OwnedParam::BigInt(Some(i))
            }
            Value::BigUnsigned(None) => OwnedParam::BigInt(None),
            Value::Float(v) => OwnedParam::Float(*v),
            Value::Double(v) => OwnedParam::Double(*v),
            Value::String(v) => OwnedParam::Text(v.clone()),
            Value::Bytes(v) => OwnedParam::Bytes(v.clone()),
            Value::ChronoDate(v) => OwnedParam::Date(v.as_ref().map(|d| NaiveDate::clone(d))),
            Value::ChronoDateTime(v) => {
                OwnedParam::Timestamp(v.as_ref().map(|d| NaiveDateTime::clone(d)))
            }
            Value::ChronoDateTimeUtc(v) => {
                OwnedParam::TimestampTz(v.as_ref().map(|d| DateTime::<Utc>::clone(d)))
            }
            Value::Json(v) => OwnedParam::Json(
                v.as_ref()
                    .map(|j| serde_json::to_string(j).map(JsonParam))
                    .transpose()
                    .map_err(|e| {
                        StoreError::UnsupportedValue(format!("Failed to serialize JSON: {e}"))
                    })?,
            ),
            _ => {
                return Err(StoreError::UnsupportedValue(format!(
                    "Unsupported value type in query: {value:?}"
                )))
            }
        };
        Ok(param)
    }

    fn as_to_sql(&self) -> &dyn ToSql {
        match self {
            OwnedParam::Bool(v) => v,
            OwnedParam::SmallInt(v) => v,
            OwnedParam::Int(v) => v,
            OwnedParam::BigInt(v) => v,
            OwnedParam::Float(v) => v,
            OwnedParam::Double(v) => v,
            OwnedParam::Text(v) => v,
            OwnedParam::Bytes(v) => v,
            OwnedParam::Date(v) => v,
            OwnedParam::Timestamp(v) => v,
            OwnedParam::TimestampTz(v) => v,
            OwnedParam::Json(v) => v,
        }
    }
}

/// Serialized JSON bound to a `json`, `jsonb` or text placeholder
#[derive(Debug)]
struct JsonParam(String);

impl ToSql for JsonParam {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if *ty == Type::JSONB {
            out.put_u8(1);
        }
        out.put_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::JSON | Type::JSONB | Type::TEXT | Type::VARCHAR | Type::UNKNOWN
        )
    }

    fn to_sql_checked(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if !<Self as ToSql>::accepts(ty) {
            return Err(format!("cannot bind JSON to a {ty} parameter").into());
        }
        self.to_sql(ty, out)
    }
}

/// Convert SeaQuery values to may_postgres `ToSql` parameters and run `f` with them.
///
/// # Errors
///
/// Returns `StoreError::UnsupportedValue` if a value cannot be bound, otherwise
/// whatever `f` returns.
pub fn with_converted_params<F, R>(values: &Values, f: F) -> Result<R, StoreError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, StoreError>,
{
    let owned = values
        .iter()
        .map(OwnedParam::from_value)
        .collect::<Result<Vec<_>, _>>()?;

    let params: Vec<&dyn ToSql> = owned.iter().map(OwnedParam::as_to_sql).collect();

    f(&params)
}
