//! Error types for the query engine.

use crate::store::StoreError;
use std::fmt;

/// The operation a [`QueryError::Database`] was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Delete,
    Select,
    Convert,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Delete => "delete",
            Operation::Select => "select",
            Operation::Convert => "convert",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query engine error type
#[derive(Debug)]
pub enum QueryError {
    /// Lookup suffix missing from the operator table
    InvalidLookup(String),
    /// Condition key whose field part is empty (e.g. `__gt`)
    EmptyField(String),
    /// The store reported failure for `operation` on `table`
    Database {
        operation: Operation,
        table: String,
        source: StoreError,
    },
    /// `delete_by_ids` called without ids
    EmptyIdSet,
    /// The store's escaping primitive failed
    StoreUnavailable(StoreError),
    /// A value kind that cannot be rendered as a SQL literal
    UnsupportedValue(String),
}

impl QueryError {
    pub(crate) fn database(operation: Operation, table: &str, source: StoreError) -> Self {
        QueryError::Database {
            operation,
            table: table.to_string(),
            source,
        }
    }

    /// The failed operation, for `Database` errors
    pub fn operation(&self) -> Option<Operation> {
        match self {
            QueryError::Database { operation, .. } => Some(*operation),
            _ => None,
        }
    }

    /// The table involved, for `Database` errors
    pub fn table(&self) -> Option<&str> {
        match self {
            QueryError::Database { table, .. } => Some(table),
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidLookup(lookup) => write!(f, "Invalid lookup \"{lookup}\""),
            QueryError::EmptyField(key) => {
                write!(f, "Condition key \"{key}\" has an empty field name")
            }
            QueryError::Database {
                operation, table, ..
            } => match operation {
                Operation::Insert => write!(f, "Failed to insert into '{table}' table"),
                Operation::Delete => write!(f, "Failed to delete from '{table}' table"),
                Operation::Select => write!(f, "Failed to select from '{table}' table"),
                Operation::Convert => {
                    write!(f, "Failed to convert data for use with '{table}' table")
                }
            },
            QueryError::EmptyIdSet => write!(f, "Cannot delete by an empty set of ids"),
            QueryError::StoreUnavailable(e) => write!(f, "Store unavailable: {e}"),
            QueryError::UnsupportedValue(s) => write!(f, "Unsupported value: {s}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QueryError::Database { source, .. } => Some(source),
            QueryError::StoreUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_messages() {
        let cases = [
            (Operation::Insert, "Failed to insert into 'people' table"),
            (Operation::Delete, "Failed to delete from 'people' table"),
            (Operation::Select, "Failed to select from 'people' table"),
            (
                Operation::Convert,
                "Failed to convert data for use with 'people' table",
            ),
        ];
        for (operation, message) in cases {
            let err = QueryError::database(operation, "people", StoreError::Other("x".into()));
            assert_eq!(err.to_string(), message);
            assert_eq!(err.operation(), Some(operation));
            assert_eq!(err.table(), Some("people"));
        }
    }

    #[test]
    fn test_database_error_exposes_store_source() {
        use std::error::Error;

        let err = QueryError::database(
            Operation::Select,
            "t",
            StoreError::Other("relation does not exist".into()),
        );
        let source = err.source().expect("source");
        assert!(source.to_string().contains("relation does not exist"));
    }

    #[test]
    fn test_error_display_variants() {
        assert_eq!(
            QueryError::InvalidLookup("like".into()).to_string(),
            "Invalid lookup \"like\""
        );
        assert!(QueryError::EmptyIdSet.to_string().contains("empty set of ids"));
        assert!(QueryError::EmptyField("__gt".into()).to_string().contains("__gt"));
        assert_eq!(QueryError::EmptyIdSet.operation(), None);
    }
}
