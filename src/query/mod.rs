//! The lookup query language.
//!
//! Condition keys are `field` or `field__lookup`; the lookup picks the
//! comparison operator. This module turns a [`Conditions`] map into a
//! [`FilterClause`] and renders the structured statements the executor runs.
//!
//! # Architecture
//!
//! - **Lookup**: operator table and key parser (`parse_key`, `Operator`)
//! - **Codec**: SQL literal rendering through the store's escaping primitive
//! - **Clause**: the `WHERE` clause builder, bound or inline
//! - **Statement**: sea-query builders for insert/delete/select by equality
//! - **Value Conversion**: SeaQuery `Value` to `ToSql` parameter conversion
//!
//! # Examples
//!
//! ```
//! use pglookup::{ClauseTerm, Conditions, FilterClause};
//!
//! let conditions = Conditions::new().with("a__gt", 1).with("b__lt", 2).with("c", 6);
//! let clause = FilterClause::build(ClauseTerm::from_conditions(&conditions))?;
//!
//! let (sql, values) = clause.to_sql();
//! assert_eq!(sql, r#"WHERE "a" > $1 AND "b" < $2 AND "c" = $3"#);
//! assert_eq!(values.iter().count(), 3);
//! # Ok::<(), pglookup::QueryError>(())
//! ```

mod clause;
mod codec;
mod error;
mod field_map;
mod lookup;
mod scalar;
pub mod statement;
pub(crate) mod value_conversion;

pub use clause::{quote_identifier, ClauseTerm, FilterClause, Predicate};
pub use codec::{escape_scalar, escape_value};
pub use error::{Operation, QueryError};
pub use field_map::{Conditions, FieldMap};
pub use lookup::{parse_conditions, parse_key, Operator, ParsedCondition, LOOKUP_DELIMITER};
pub use scalar::Scalar;
