//! Structured statements built with sea-query.
//!
//! These cover the equality-only operations: insert a row, and delete or
//! select by `column = value` conditions joined with `AND`. Identifiers are
//! quoted by the PostgreSQL query builder; values are always bound.

use crate::store::StoreError;
use sea_query::{Asterisk, Expr, ExprTrait, Iden, PostgresQueryBuilder, Query, Value, Values};

struct Ident(String);

impl Iden for Ident {
    fn unquoted(&self) -> &str {
        &self.0
    }
}

fn ident(name: &str) -> Ident {
    Ident(name.to_string())
}

/// `INSERT INTO "table" (...) VALUES (...)`
///
/// # Errors
///
/// Fails when `row` is empty.
pub fn insert(table: &str, row: Vec<(String, Value)>) -> Result<(String, Values), StoreError> {
    if row.is_empty() {
        return Err(StoreError::Other("No fields to insert".to_string()));
    }
    let (columns, values): (Vec<String>, Vec<Value>) = row.into_iter().unzip();

    let mut query = Query::insert();
    query
        .into_table(ident(table))
        .columns(columns.iter().map(|c| ident(c)));
    query
        .values(values.into_iter().map(Into::into))
        .map_err(|e| StoreError::Other(format!("Failed to build insert: {e:?}")))?;
    Ok(query.build(PostgresQueryBuilder))
}

/// `DELETE FROM "table" WHERE "c1" = $1 AND ...`
///
/// # Errors
///
/// Fails when `conditions` is empty, so a delete never targets the whole table.
pub fn delete(table: &str, conditions: Vec<(String, Value)>) -> Result<(String, Values), StoreError> {
    if conditions.is_empty() {
        return Err(StoreError::Other("No conditions to delete by".to_string()));
    }
    let mut query = Query::delete();
    query.from_table(ident(table));
    for (column, value) in conditions {
        query.and_where(Expr::col(Ident(column)).eq(value));
    }
    Ok(query.build(PostgresQueryBuilder))
}

/// `SELECT * FROM "table" [WHERE "c1" = $1 AND ...]`
pub fn select(table: &str, conditions: Vec<(String, Value)>) -> (String, Values) {
    let mut query = Query::select();
    query.column(Asterisk).from(ident(table));
    for (column, value) in conditions {
        query.and_where(Expr::col(Ident(column)).eq(value));
    }
    query.build(PostgresQueryBuilder)
}
