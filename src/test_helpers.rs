//! In-memory [`Store`] for unit tests.
//!
//! `MockStore` records every statement it is handed and answers from
//! scripted responses. Escaping uses the real PostgreSQL literal rules.

use crate::store::{ColumnDef, ColumnType, Record, Store, StoreError};
use sea_query::{Value, Values};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A statement received by [`MockStore::execute`] or [`MockStore::query_all`]
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedStatement {
    pub sql: String,
    pub values: Vec<Value>,
}

#[derive(Default)]
struct MockState {
    statements: Vec<CapturedStatement>,
    escaped: Vec<String>,
    metadata_requests: Vec<String>,
    query_results: VecDeque<Result<Vec<Record>, String>>,
    execute_results: VecDeque<Result<u64, String>>,
}

#[derive(Default)]
pub struct MockStore {
    tables: Vec<(String, Vec<ColumnDef>)>,
    fail_escape: bool,
    state: Mutex<MockState>,
}

fn lock(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a table so `table_columns` can report it
    pub fn with_table(mut self, name: &str, columns: Vec<ColumnDef>) -> Self {
        self.tables.push((name.to_string(), columns));
        self
    }

    /// Queue rows for the next `query_all`
    pub fn with_rows(self, rows: Vec<Record>) -> Self {
        lock(&self.state).query_results.push_back(Ok(rows));
        self
    }

    /// Queue a failure for the next `query_all`
    pub fn with_query_error(self, message: &str) -> Self {
        lock(&self.state)
            .query_results
            .push_back(Err(message.to_string()));
        self
    }

    /// Queue an affected-row count for the next `execute`
    pub fn with_affected(self, count: u64) -> Self {
        lock(&self.state).execute_results.push_back(Ok(count));
        self
    }

    /// Queue a failure for the next `execute`
    pub fn with_execute_error(self, message: &str) -> Self {
        lock(&self.state)
            .execute_results
            .push_back(Err(message.to_string()));
        self
    }

    /// Make every `escape_literal` call fail
    pub fn with_escape_failure(mut self) -> Self {
        self.fail_escape = true;
        self
    }

    pub fn statements(&self) -> Vec<CapturedStatement> {
        lock(&self.state).statements.clone()
    }

    pub fn sql(&self) -> Vec<String> {
        lock(&self.state)
            .statements
            .iter()
            .map(|s| s.sql.clone())
            .collect()
    }

    /// Inputs passed to `escape_literal`, in call order
    pub fn escaped(&self) -> Vec<String> {
        lock(&self.state).escaped.clone()
    }

    /// Tables passed to `table_columns`, in call order
    pub fn metadata_requests(&self) -> Vec<String> {
        lock(&self.state).metadata_requests.clone()
    }

    fn capture(&self, sql: &str, values: &Values) {
        lock(&self.state).statements.push(CapturedStatement {
            sql: sql.to_string(),
            values: values.iter().cloned().collect(),
        });
    }
}

impl Store for MockStore {
    fn execute(&self, sql: &str, values: &Values) -> Result<u64, StoreError> {
        self.capture(sql, values);
        match lock(&self.state).execute_results.pop_front() {
            Some(Ok(count)) => Ok(count),
            Some(Err(message)) => Err(StoreError::Other(message)),
            None => Ok(1),
        }
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Record>, StoreError> {
        self.capture(sql, values);
        match lock(&self.state).query_results.pop_front() {
            Some(Ok(rows)) => Ok(rows),
            Some(Err(message)) => Err(StoreError::Other(message)),
            None => Ok(Vec::new()),
        }
    }

    fn escape_literal(&self, text: &str) -> Result<String, StoreError> {
        lock(&self.state).escaped.push(text.to_string());
        if self.fail_escape {
            return Err(StoreError::Other("connection closed".to_string()));
        }
        Ok(postgres_protocol::escape::escape_literal(text))
    }

    fn table_columns(&self, table: &str) -> Result<Vec<ColumnDef>, StoreError> {
        lock(&self.state).metadata_requests.push(table.to_string());
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns.clone())
            .ok_or_else(|| StoreError::Other(format!("relation \"{table}\" does not exist")))
    }
}

/// Columns of the `people` table
pub fn people_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::new("person_id", ColumnType::Integer),
        ColumnDef::new("first_name", ColumnType::Text),
        ColumnDef::new("last_name", ColumnType::Text),
        ColumnDef::new("birthdate", ColumnType::Date),
        ColumnDef::new("gender", ColumnType::Boolean),
        ColumnDef::new("town", ColumnType::Text),
    ]
}

/// A `people` store with the standard schema
pub fn people_store() -> MockStore {
    MockStore::new().with_table("people", people_columns())
}
