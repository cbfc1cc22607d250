//! Error types for model operations.

use super::validators::ValidationError;
use crate::query::QueryError;

/// Error type for model operations
#[derive(Debug)]
pub enum ModelError {
    /// A field value failed validation
    Validation(ValidationError),
    /// A condition names a field the model does not declare
    InvalidField(String),
    /// The query layer failed
    Query(QueryError),
    /// A fetched row is missing a column or holds an unreadable value
    Decode { column: String, reason: String },
    /// No row matched the requested key
    NotFound { table: String, key: String },
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Validation(e) => write!(f, "{e}"),
            ModelError::InvalidField(name) => write!(f, "Invalid field name '{name}'"),
            ModelError::Query(e) => write!(f, "{e}"),
            ModelError::Decode { column, reason } => {
                write!(f, "Cannot decode column '{column}': {reason}")
            }
            ModelError::NotFound { table, key } => {
                write!(f, "No row in '{table}' table for key {key}")
            }
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Validation(e) => Some(e),
            ModelError::Query(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for ModelError {
    fn from(err: ValidationError) -> Self {
        ModelError::Validation(err)
    }
}

impl From<QueryError> for ModelError {
    fn from(err: QueryError) -> Self {
        ModelError::Query(err)
    }
}

impl ModelError {
    pub(crate) fn decode(column: &str, reason: impl Into<String>) -> Self {
        ModelError::Decode {
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
