//! Model layer: validated entities over [`crate::DatabaseConnection`].
//!
//! - **Validators**: field-level checks raising `ValidationError`
//! - **Person**: one row of the `people` table
//! - **PersonList**: the people matching a set of lookup conditions

mod error;
pub mod person;
mod person_list;
pub mod validators;

pub use error::ModelError;
pub use person::{age_on, Gender, Person, PersonField, PersonInput};
pub use person_list::PersonList;
pub use validators::ValidationError;
