use super::person::{Person, PersonField};
use super::ModelError;
use crate::database::DatabaseConnection;
use crate::query::{parse_key, Conditions, Scalar};
use crate::store::Store;

/// The people matching a set of lookup conditions
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonList {
    objects: Vec<Person>,
}

impl PersonList {
    /// Select the people matching `conditions`.
    ///
    /// Keys take the `field` or `field__lookup` form; `field` must be one of
    /// [`PersonField`].
    ///
    /// ```no_run
    /// use pglookup::{Conditions, DatabaseConfig, DatabaseConnection, Operator, PersonList};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = DatabaseConnection::connect(&DatabaseConfig::default())?;
    /// let people = PersonList::fetch(
    ///     &db,
    ///     &Conditions::new()
    ///         .filter("birthdate", Operator::Gte, "1990-01-01")
    ///         .with("town", "Oslo"),
    /// )?;
    /// for person in &people {
    ///     println!("{} {}", person.first_name(), person.last_name());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn fetch<S: Store>(
        db: &DatabaseConnection<S>,
        conditions: &Conditions,
    ) -> Result<Self, ModelError> {
        check_fields(conditions)?;
        let rows = db.select_by_filter(Person::TABLE_NAME, conditions)?;
        let objects = rows
            .iter()
            .map(Person::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { objects })
    }

    /// Delete every listed person with one `IN` statement.
    ///
    /// # Errors
    ///
    /// `QueryError::EmptyIdSet` (wrapped) when no listed person has an id.
    pub fn delete<S: Store>(&self, db: &DatabaseConnection<S>) -> Result<u64, ModelError> {
        let ids: Vec<Scalar> = self
            .objects
            .iter()
            .filter_map(Person::person_id)
            .map(Scalar::Int)
            .collect();
        Ok(db.delete_by_ids(Person::TABLE_NAME, PersonField::PersonId.as_str(), &ids)?)
    }

    /// Each person's fields, in declared order
    pub fn fields(&self) -> Vec<Vec<Option<Scalar>>> {
        self.objects.iter().map(Person::fields).collect()
    }

    pub fn objects(&self) -> &[Person] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

fn check_fields(conditions: &Conditions) -> Result<(), ModelError> {
    for key in conditions.keys() {
        let (field, _) = parse_key(key);
        if PersonField::from_name(field).is_none() {
            return Err(ModelError::InvalidField(field.to_string()));
        }
    }
    Ok(())
}

impl IntoIterator for PersonList {
    type Item = Person;
    type IntoIter = std::vec::IntoIter<Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

impl<'a> IntoIterator for &'a PersonList {
    type Item = &'a Person;
    type IntoIter = std::slice::Iter<'a, Person>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
