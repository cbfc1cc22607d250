//! Public API tests for the lookup language and the executor, run against an
//! in-process store.

use pglookup::store::{ColumnDef, ColumnType, Record, Store, StoreError};
use pglookup::{
    parse_key, ClauseTerm, Conditions, DatabaseConnection, FilterClause, Operation, QueryError,
    Scalar,
};
use sea_query::{Value, Values};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingStore {
    statements: RefCell<Vec<(String, Vec<Value>)>>,
    rows: Vec<Record>,
    fail_queries: bool,
}

impl Store for RecordingStore {
    fn execute(&self, sql: &str, values: &Values) -> Result<u64, StoreError> {
        self.statements
            .borrow_mut()
            .push((sql.to_string(), values.iter().cloned().collect()));
        Ok(0)
    }

    fn query_all(&self, sql: &str, values: &Values) -> Result<Vec<Record>, StoreError> {
        self.statements
            .borrow_mut()
            .push((sql.to_string(), values.iter().cloned().collect()));
        if self.fail_queries {
            return Err(StoreError::Other("relation \"people\" is locked".to_string()));
        }
        Ok(self.rows.clone())
    }

    fn escape_literal(&self, text: &str) -> Result<String, StoreError> {
        Ok(format!("'{}'", text.replace('\'', "''")))
    }

    fn table_columns(&self, _table: &str) -> Result<Vec<ColumnDef>, StoreError> {
        Ok(vec![
            ColumnDef::new("a", ColumnType::BigInt),
            ColumnDef::new("b", ColumnType::BigInt),
            ColumnDef::new("c", ColumnType::BigInt),
            ColumnDef::new("town", ColumnType::Text),
        ])
    }
}

#[test]
fn test_key_parser_round_trip() {
    assert_eq!(parse_key("a__gt"), ("a", Some("gt")));
    assert_eq!(parse_key("a"), ("a", None));
    assert_eq!(parse_key("a__b__c"), ("a", Some("b__c")));
}

#[test]
fn test_filtered_select_issues_one_query() {
    let row = Record::new().with("a", 3i64).with("b", 1i64).with("c", 6i64);
    let store = RecordingStore {
        rows: vec![row.clone()],
        ..RecordingStore::default()
    };
    let db = DatabaseConnection::new(store);
    let conditions = Conditions::new().with("a__gt", 1).with("b__lt", 2).with("c", 6);

    let rows = db.select_by_filter("people", &conditions).unwrap();
    assert_eq!(rows, vec![row]);

    let statements = db.store().statements.borrow();
    assert_eq!(statements.len(), 1);
    assert_eq!(
        statements[0].0,
        r#"SELECT * FROM people WHERE "a" > $1 AND "b" < $2 AND "c" = $3"#
    );
    assert_eq!(
        statements[0].1,
        vec![Value::from(1i64), Value::from(2i64), Value::from(6i64)]
    );
}

#[test]
fn test_inline_clause_text() {
    let store = RecordingStore::default();
    let conditions = Conditions::new().with("a__gt", 1).with("b__lt", 2).with("c", 6);
    let clause = FilterClause::build(ClauseTerm::from_conditions(&conditions)).unwrap();

    assert_eq!(
        clause.to_inline_sql(&store).unwrap(),
        r#"WHERE "a" > 1 AND "b" < 2 AND "c" = 6"#
    );
}

#[test]
fn test_empty_filter_selects_everything() {
    let db = DatabaseConnection::new(RecordingStore::default());
    db.select_by_filter("people", &Conditions::new()).unwrap();
    assert_eq!(db.store().statements.borrow()[0].0, "SELECT * FROM people");
}

#[test]
fn test_unknown_lookup_never_reaches_the_store() {
    let db = DatabaseConnection::new(RecordingStore::default());
    let err = db
        .select_by_filter("people", &Conditions::new().with("town__contains", "sl"))
        .unwrap_err();

    assert!(matches!(err, QueryError::InvalidLookup(ref t) if t == "contains"));
    assert!(db.store().statements.borrow().is_empty());
}

#[test]
fn test_failed_select_names_operation_and_table() {
    let store = RecordingStore {
        fail_queries: true,
        ..RecordingStore::default()
    };
    let db = DatabaseConnection::new(store);
    let err = db
        .select_by_filter("people", &Conditions::new().with("town", "Oslo"))
        .unwrap_err();

    assert_eq!(err.operation(), Some(Operation::Select));
    assert_eq!(err.table(), Some("people"));
}

#[test]
fn test_delete_by_ids_text() {
    let db = DatabaseConnection::new(RecordingStore::default());
    db.delete_by_ids("t", "id", &[Scalar::from(1), Scalar::from(2), Scalar::from(3)])
        .unwrap();
    db.delete_by_ids("t", "id", &[Scalar::from("1"), Scalar::from("2"), Scalar::from("3")])
        .unwrap();

    let statements = db.store().statements.borrow();
    assert_eq!(statements[0].0, "DELETE FROM t WHERE id IN (1,2,3)");
    assert_eq!(statements[1].0, "DELETE FROM t WHERE id IN ('1','2','3')");
}

#[test]
fn test_delete_by_ids_rejects_empty_set() {
    let db = DatabaseConnection::new(RecordingStore::default());
    assert!(matches!(
        db.delete_by_ids("t", "id", &[]),
        Err(QueryError::EmptyIdSet)
    ));
    assert!(db.store().statements.borrow().is_empty());
}
