//! `PgStore` - the `may_postgres` implementation of [`Store`].

use super::{ColumnDef, ColumnType, Record, Store, StoreError};
use crate::connection::{self, ConnectionError};
use crate::query::value_conversion::with_converted_params;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use may_postgres::types::{FromSql, Type};
use may_postgres::{Client, Row};
use sea_query::{Value, Values};
use std::time::Instant;

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;
#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;

const TABLE_COLUMNS_SQL: &str = "SELECT column_name::text, udt_name::text \
     FROM information_schema.columns \
     WHERE table_name::text = $1 \
       AND table_schema::text = ANY(current_schemas(false)::text[]) \
     ORDER BY ordinal_position";

/// A [`Store`] over a single `may_postgres::Client`
///
/// The client is owned exclusively and closed when the store is dropped.
pub struct PgStore {
    client: Client,
}

impl PgStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect with a URI or key-value connection string
    pub fn connect(connection_string: &str) -> Result<Self, ConnectionError> {
        connection::connect(connection_string).map(Self::new)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl Drop for PgStore {
    fn drop(&mut self) {
        log::info!("closing PostgreSQL connection");
    }
}

impl Store for PgStore {
    fn execute(&self, sql: &str, values: &Values) -> Result<u64, StoreError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(sql).entered();

        let start = Instant::now();
        let result = with_converted_params(values, |params| {
            self.client.execute(sql, params).map_err(StoreError::from)
        });
        observe(sql, &result, start);
        result
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Record>, StoreError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(sql).entered();

        let start = Instant::now();
        let result = with_converted_params(values, |params| {
            let rows = self.client.query(sql, params)?;
            rows.iter().map(record_from_row).collect()
        });
        observe(sql, &result, start);
        result
    }

    fn escape_literal(&self, text: &str) -> Result<String, StoreError> {
        Ok(postgres_protocol::escape::escape_literal(text))
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnDef>, StoreError> {
        let rows = self.client.query(TABLE_COLUMNS_SQL, &[&table])?;
        if rows.is_empty() {
            return Err(StoreError::Other(format!("relation \"{table}\" does not exist")));
        }
        rows.iter()
            .map(|row| {
                let name: String = row.try_get::<usize, String>(0)?;
                let type_name: String = row.try_get::<usize, String>(1)?;
                Ok(ColumnDef::new(name, ColumnType::from_type_name(&type_name)))
            })
            .collect()
    }
}

fn observe<T>(sql: &str, result: &Result<T, StoreError>, start: Instant) {
    let duration = start.elapsed();
    #[cfg(feature = "metrics")]
    METRICS.record_query_duration(duration);

    match result {
        Ok(_) => log::debug!("query completed in {duration:?}: {sql}"),
        Err(e) => {
            #[cfg(feature = "metrics")]
            METRICS.record_query_error();
            log::warn!("query failed after {duration:?}: {sql}: {e}");
        }
    }
}

fn record_from_row(row: &Row) -> Result<Record, StoreError> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let column_type = ColumnType::from_type_name(column.type_().name());
        record.push(column.name(), decode_column(row, idx, &column_type)?);
    }
    Ok(record)
}

fn decode_column(row: &Row, idx: usize, column_type: &ColumnType) -> Result<Value, StoreError> {
    let value = match column_type {
        ColumnType::SmallInt => Value::from(row.try_get::<usize, Option<i16>>(idx)?),
        ColumnType::Integer => Value::from(row.try_get::<usize, Option<i32>>(idx)?),
        ColumnType::BigInt => Value::from(row.try_get::<usize, Option<i64>>(idx)?),
        ColumnType::Boolean => Value::from(row.try_get::<usize, Option<bool>>(idx)?),
        ColumnType::Text => Value::from(row.try_get::<usize, Option<String>>(idx)?),
        ColumnType::Date => Value::from(row.try_get::<usize, Option<NaiveDate>>(idx)?),
        ColumnType::Real => Value::from(row.try_get::<usize, Option<f32>>(idx)?),
        ColumnType::Double => Value::from(row.try_get::<usize, Option<f64>>(idx)?),
        ColumnType::Timestamp => Value::from(row.try_get::<usize, Option<NaiveDateTime>>(idx)?),
        ColumnType::TimestampTz => {
            Value::from(row.try_get::<usize, Option<DateTime<Utc>>>(idx)?)
        }
        ColumnType::Json => Value::from(
            row.try_get::<usize, Option<JsonColumn>>(idx)?
                .map(|json| json.0),
        ),
        ColumnType::Other(name) => match row.try_get::<usize, Option<String>>(idx) {
            Ok(text) => Value::from(text),
            Err(_) => {
                return Err(StoreError::UnsupportedValue(format!(
                    "column {idx} has type {name}, which cannot be decoded"
                )))
            }
        },
    };
    Ok(value)
}

/// A `json` or `jsonb` column parsed with `serde_json`
struct JsonColumn(serde_json::Value);

impl<'a> FromSql<'a> for JsonColumn {
    fn from_sql(
        ty: &Type,
        raw: &'a [u8],
    ) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        // jsonb carries a one-byte format version ahead of the text
        let text = if *ty == Type::JSONB {
            match raw.split_first() {
                Some((1, rest)) => rest,
                _ => return Err("unsupported jsonb encoding version".into()),
            }
        } else {
            raw
        };
        Ok(JsonColumn(serde_json::from_slice(text)?))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::JSON || *ty == Type::JSONB
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_column_reads_json_text() {
        let parsed = JsonColumn::from_sql(&Type::JSON, br#"{"tags":["a","b"]}"#).unwrap();
        assert_eq!(parsed.0, json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn test_json_column_strips_jsonb_version() {
        let mut raw = vec![1u8];
        raw.extend_from_slice(b"[1,2]");
        let parsed = JsonColumn::from_sql(&Type::JSONB, &raw).unwrap();
        assert_eq!(parsed.0, json!([1, 2]));

        raw[0] = 2;
        assert!(JsonColumn::from_sql(&Type::JSONB, &raw).is_err());
    }

    #[test]
    fn test_json_column_accepts_only_json_types() {
        assert!(<JsonColumn as FromSql>::accepts(&Type::JSON));
        assert!(<JsonColumn as FromSql>::accepts(&Type::JSONB));
        assert!(!<JsonColumn as FromSql>::accepts(&Type::TEXT));
    }
}
