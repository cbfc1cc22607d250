//! Query executor.
//!
//! [`DatabaseConnection`] owns one [`Store`] and runs every operation
//! synchronously against it. Store failures are reported as
//! [`QueryError::Database`] naming the operation and table.

use crate::config::DatabaseConfig;
use crate::connection::ConnectionError;
use crate::query::{
    escape_scalar, parse_conditions, statement, ClauseTerm, Conditions, FieldMap, FilterClause,
    Operation, QueryError, Scalar,
};
use crate::store::{convert_fields, PgStore, Record, Store, StoreError};
use sea_query::Value;

/// A connection wrapper exposing CRUD operations and lookup-filtered selects
///
/// # Examples
///
/// ```no_run
/// use pglookup::{Conditions, DatabaseConfig, DatabaseConnection, FieldMap};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let db = DatabaseConnection::connect(&DatabaseConfig::load()?)?;
///
/// db.insert(
///     "people",
///     &FieldMap::new().with("first_name", "Ann").with("town", "Oslo"),
/// )?;
///
/// let adults = db.select_by_filter(
///     "people",
///     &Conditions::new().with("birthdate__lte", "2006-01-01").with("town", "Oslo"),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct DatabaseConnection<S: Store = PgStore> {
    store: S,
}

impl DatabaseConnection<PgStore> {
    /// Connect with the given settings
    pub fn connect(config: &DatabaseConfig) -> Result<Self, ConnectionError> {
        PgStore::connect(&config.connection_string()).map(Self::new)
    }
}

impl<S: Store> DatabaseConnection<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Release the store now rather than at end of scope
    pub fn close(self) {
        drop(self.store);
    }

    /// Insert one row. Returns the number of rows inserted.
    pub fn insert(&self, table: &str, fields: &FieldMap) -> Result<u64, QueryError> {
        let values = self.convert(Operation::Insert, table, fields.iter())?;
        let row = zip_columns(fields, values);
        let (sql, values) =
            statement::insert(table, row).map_err(|e| failure(Operation::Insert, table, e))?;
        self.store
            .execute(&sql, &values)
            .map_err(|e| failure(Operation::Insert, table, e))
    }

    /// Delete rows matching every `column = value` condition.
    ///
    /// Keys are column names; lookup suffixes are not interpreted.
    pub fn delete_by_equality(&self, table: &str, conditions: &FieldMap) -> Result<u64, QueryError> {
        let values = self.convert(Operation::Delete, table, conditions.iter())?;
        let conditions = zip_columns(conditions, values);
        let (sql, values) =
            statement::delete(table, conditions).map_err(|e| failure(Operation::Delete, table, e))?;
        self.store
            .execute(&sql, &values)
            .map_err(|e| failure(Operation::Delete, table, e))
    }

    /// Select every row matching all `column = value` conditions.
    pub fn select_by_equality(
        &self,
        table: &str,
        conditions: &FieldMap,
    ) -> Result<Vec<Record>, QueryError> {
        let values = self.convert(Operation::Select, table, conditions.iter())?;
        let (sql, values) = statement::select(table, zip_columns(conditions, values));
        self.store
            .query_all(&sql, &values)
            .map_err(|e| failure(Operation::Select, table, e))
    }

    /// Select the rows matching `conditions`, which may carry lookup suffixes.
    ///
    /// Runs exactly one query, `SELECT * FROM <table> <clause>`, with the
    /// clause values bound as parameters. An empty map selects every row.
    ///
    /// # Errors
    ///
    /// - `Database { Convert, .. }` when a value does not fit its column
    /// - `InvalidLookup` for a suffix outside the operator table
    /// - `Database { Select, .. }` when the query fails
    pub fn select_by_filter(
        &self,
        table: &str,
        conditions: &Conditions,
    ) -> Result<Vec<Record>, QueryError> {
        let parsed = parse_conditions(conditions);
        let values = self.convert(
            Operation::Convert,
            table,
            parsed.iter().map(|p| (p.field.as_str(), &p.value)),
        )?;

        let terms = parsed.into_iter().zip(values).map(|(p, value)| ClauseTerm {
            field: p.field,
            lookup: p.lookup,
            value,
        });
        let clause = FilterClause::build(terms)?;

        let (where_sql, values) = clause.to_sql();
        let sql = if clause.is_empty() {
            format!("SELECT * FROM {table}")
        } else {
            format!("SELECT * FROM {table} {where_sql}")
        };

        let rows = self
            .store
            .query_all(&sql, &values)
            .map_err(|e| failure(Operation::Select, table, e))?;
        log::debug!("select_by_filter on {table} returned {} rows", rows.len());
        Ok(rows)
    }

    /// Delete the rows whose `id_field` is one of `ids`.
    ///
    /// Each id is rendered through the store's literal escaping and the list
    /// is inlined: `DELETE FROM t WHERE id IN (1,2,3)`.
    ///
    /// # Errors
    ///
    /// `EmptyIdSet` when `ids` is empty, before the store is touched.
    pub fn delete_by_ids(
        &self,
        table: &str,
        id_field: &str,
        ids: &[Scalar],
    ) -> Result<u64, QueryError> {
        if ids.is_empty() {
            return Err(QueryError::EmptyIdSet);
        }
        let literals = ids
            .iter()
            .map(|id| escape_scalar(&self.store, id))
            .collect::<Result<Vec<String>, QueryError>>()?;

        let sql = format!(
            "DELETE FROM {table} WHERE {id_field} IN ({})",
            literals.join(",")
        );
        self.store
            .execute(&sql, &sea_query::Values(Vec::new()))
            .map_err(|e| failure(Operation::Delete, table, e))
    }

    fn convert<'a, I>(&self, operation: Operation, table: &str, fields: I) -> Result<Vec<Value>, QueryError>
    where
        I: IntoIterator<Item = (&'a str, &'a Scalar)>,
    {
        let mut fields = fields.into_iter().peekable();
        if fields.peek().is_none() {
            return Ok(Vec::new());
        }
        let columns = self
            .store
            .table_columns(table)
            .map_err(|e| failure(operation, table, e))?;
        convert_fields(&columns, fields).map_err(|e| failure(operation, table, StoreError::from(e)))
    }
}

fn zip_columns(fields: &FieldMap, values: Vec<Value>) -> Vec<(String, Value)> {
    fields.keys().map(str::to_string).zip(values).collect()
}

fn failure(operation: Operation, table: &str, source: StoreError) -> QueryError {
    log::warn!("{operation} on '{table}' failed: {source}");
    QueryError::database(operation, table, source)
}
