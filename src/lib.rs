//! # pglookup
//!
//! A minimal PostgreSQL data-access layer: a connection wrapper with CRUD
//! operations, plus a lookup language for filters where a condition key is
//! `field` or `field__operator` (`age__gt` becomes `"age" > $1`).
//!
//! - [`DatabaseConnection`] runs inserts, deletes and selects over a [`Store`]
//! - [`query`] parses condition keys and builds the `WHERE` clause
//! - [`model`] holds the validated `Person` entity and its list type
//!
//! ```no_run
//! use pglookup::{Conditions, DatabaseConfig, DatabaseConnection};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db = DatabaseConnection::connect(&DatabaseConfig::load()?)?;
//! let rows = db.select_by_filter(
//!     "people",
//!     &Conditions::new().with("person_id__gt", 10).with("town", "Oslo"),
//! )?;
//! println!("{} rows", rows.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod database;
pub mod metrics;
pub mod model;
pub mod query;
pub mod store;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use config::DatabaseConfig;
pub use connection::ConnectionError;
pub use database::DatabaseConnection;
pub use model::{Gender, ModelError, Person, PersonField, PersonInput, PersonList, ValidationError};
pub use query::{
    parse_key, ClauseTerm, Conditions, FieldMap, FilterClause, Operation, Operator, QueryError,
    Scalar,
};
pub use store::{ColumnDef, ColumnType, PgStore, Record, Store, StoreError};
