//! Store Module
//!
//! The `Store` trait is the seam between the query engine and the database
//! driver. It exposes the four primitives the engine needs:
//! - statement execution with bind values
//! - raw query execution with all rows fetched
//! - native literal escaping
//! - table column metadata (used by field conversion)
//!
//! [`PgStore`] is the `may_postgres` implementation. Tests use
//! `test_helpers::MockStore`.

pub mod convert;
pub mod postgres;
mod record;

pub use convert::{convert_fields, convert_value, ConversionError};
pub use postgres::PgStore;
pub use record::Record;

use may_postgres::Error as PostgresError;
use sea_query::Values;
use std::fmt;

/// Store-level error type
#[derive(Debug)]
pub enum StoreError {
    /// `PostgreSQL` error from `may_postgres`
    PostgresError(PostgresError),
    /// A field value could not be adapted to its column
    Conversion(ConversionError),
    /// A value kind the driver cannot bind or decode
    UnsupportedValue(String),
    /// Other store errors
    Other(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::PostgresError(e) => write!(f, "PostgreSQL error: {e}"),
            StoreError::Conversion(e) => write!(f, "Conversion error: {e}"),
            StoreError::UnsupportedValue(s) => write!(f, "Unsupported value: {s}"),
            StoreError::Other(s) => write!(f, "Store error: {s}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::PostgresError(e) => Some(e),
            StoreError::Conversion(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for StoreError {
    fn from(err: PostgresError) -> Self {
        StoreError::PostgresError(err)
    }
}

impl From<ConversionError> for StoreError {
    fn from(err: ConversionError) -> Self {
        StoreError::Conversion(err)
    }
}

/// Column type as reported by the table metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    SmallInt,
    Integer,
    BigInt,
    Boolean,
    Text,
    Date,
    Real,
    Double,
    /// `timestamp without time zone`
    Timestamp,
    /// `timestamp with time zone`, read and written as UTC
    TimestampTz,
    /// `json` or `jsonb`
    Json,
    /// Any type the conversion step does not handle, by its type name
    Other(String),
}

impl ColumnType {
    /// Map a PostgreSQL type name to a `ColumnType`.
    ///
    /// Accepts both the internal names (`int4`, `varchar`, ...) reported by
    /// `udt_name` and `Type::name()`, and the SQL-standard spellings
    /// (`integer`, `character varying`, ...).
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "int2" | "smallint" => ColumnType::SmallInt,
            "int4" | "integer" | "int" => ColumnType::Integer,
            "int8" | "bigint" => ColumnType::BigInt,
            "bool" | "boolean" => ColumnType::Boolean,
            "text" | "varchar" | "character varying" | "bpchar" | "character" | "char"
            | "name" => ColumnType::Text,
            "date" => ColumnType::Date,
            "float4" | "real" => ColumnType::Real,
            "float8" | "double precision" => ColumnType::Double,
            "timestamp" | "timestamp without time zone" => ColumnType::Timestamp,
            "timestamptz" | "timestamp with time zone" => ColumnType::TimestampTz,
            "json" | "jsonb" => ColumnType::Json,
            other => ColumnType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::SmallInt => "smallint",
            ColumnType::Integer => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
            ColumnType::Real => "real",
            ColumnType::Double => "double precision",
            ColumnType::Timestamp => "timestamp",
            ColumnType::TimestampTz => "timestamptz",
            ColumnType::Json => "json",
            ColumnType::Other(name) => name,
        };
        f.write_str(name)
    }
}

/// One column of a table, as reported by [`Store::table_columns`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Driver capabilities consumed by [`crate::DatabaseConnection`]
///
/// Implementations are used from one caller at a time; nothing here is
/// expected to be internally synchronized.
///
/// # Examples
///
/// ```no_run
/// use pglookup::{PgStore, Store, StoreError};
/// use sea_query::{Value, Values};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = PgStore::connect("host=localhost user=postgres dbname=mydb")?;
///
/// let affected = store.execute(
///     "DELETE FROM people WHERE person_id = $1",
///     &Values(vec![Value::from(42i64)]),
/// )?;
/// let rows = store.query_all("SELECT * FROM people", &Values(Vec::new()))?;
/// let quoted = store.escape_literal("O'Brien")?;
/// assert_eq!(quoted, "'O''Brien'");
/// # Ok(())
/// # }
/// ```
pub trait Store {
    /// Execute a statement and return the number of rows affected
    fn execute(&self, sql: &str, values: &Values) -> Result<u64, StoreError>;

    /// Execute a query and fetch every resulting row, in order
    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Record>, StoreError>;

    /// Quote `text` as a SQL string literal using the store's own rules.
    ///
    /// [`PgStore`] escapes on the client side and never fails. A store that
    /// needs a live session to escape reports the lost session here.
    fn escape_literal(&self, text: &str) -> Result<String, StoreError>;

    /// Columns of `table` in ordinal order
    fn table_columns(&self, table: &str) -> Result<Vec<ColumnDef>, StoreError>;
}
