//! The `people` table model.

use super::validators::{
    parse_date, validate_alphabetic, validate_bit, validate_max_length, validate_numeric,
    ValidationError,
};
use super::ModelError;
use crate::database::DatabaseConnection;
use crate::query::{FieldMap, Scalar};
use crate::store::{Record, Store};
use chrono::{Local, NaiveDate};

const NAME_MAX_LENGTH: usize = 30;
const TOWN_MAX_LENGTH: usize = 168;

/// Declared columns of the `people` table, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    PersonId,
    FirstName,
    LastName,
    Birthdate,
    Gender,
    Town,
}

impl PersonField {
    pub const ALL: [PersonField; 6] = [
        PersonField::PersonId,
        PersonField::FirstName,
        PersonField::LastName,
        PersonField::Birthdate,
        PersonField::Gender,
        PersonField::Town,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PersonField::PersonId => "person_id",
            PersonField::FirstName => "first_name",
            PersonField::LastName => "last_name",
            PersonField::Birthdate => "birthdate",
            PersonField::Gender => "gender",
            PersonField::Town => "town",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }

    fn prefix(self) -> String {
        format!("\"{}\" field", self.as_str())
    }
}

/// Stored as a boolean: `false` is male, `true` is female
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Gender::Female
        } else {
            Gender::Male
        }
    }

    pub fn as_bit(self) -> bool {
        matches!(self, Gender::Female)
    }

    pub fn verbose(self) -> &'static str {
        match self {
            Gender::Male => "муж",
            Gender::Female => "жен",
        }
    }
}

/// Unvalidated field values for [`Person::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonInput {
    pub person_id: Option<Scalar>,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
    pub gender: Scalar,
    pub town: String,
}

/// One row of the `people` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    person_id: Option<i64>,
    first_name: String,
    last_name: String,
    birthdate: NaiveDate,
    gender: Gender,
    town: String,
}

impl Person {
    pub const TABLE_NAME: &'static str = "people";

    /// Validate every field and build a person.
    ///
    /// # Errors
    ///
    /// The first failing field's `ValidationError`.
    pub fn new(input: PersonInput) -> Result<Self, ValidationError> {
        let PersonInput {
            person_id,
            first_name,
            last_name,
            birthdate,
            gender,
            town,
        } = input;

        let mut person = Person {
            person_id: None,
            first_name: String::new(),
            last_name: String::new(),
            birthdate: NaiveDate::default(),
            gender: Gender::Male,
            town: String::new(),
        };
        person.set_person_id(person_id.as_ref())?;
        person.set_first_name(&first_name)?;
        person.set_last_name(&last_name)?;
        person.set_birthdate(&birthdate)?;
        person.set_gender(&gender)?;
        person.set_town(&town)?;
        Ok(person)
    }

    /// Decode a fetched row without validating it
    pub fn from_record(record: &Record) -> Result<Self, ModelError> {
        let text = |field: PersonField| {
            record
                .get_string(field.as_str())
                .ok_or_else(|| ModelError::decode(field.as_str(), "missing or NULL text"))
        };

        let id_column = PersonField::PersonId.as_str();
        let person_id = match record.get_i64(id_column) {
            Some(id) => Some(id),
            // absent or NULL means not stored yet; anything else is unreadable
            None => match record.get_string(id_column) {
                None => None,
                Some(raw) => {
                    return Err(ModelError::decode(
                        id_column,
                        format!("{raw:?} is not an integer id"),
                    ))
                }
            },
        };
        let birthdate = record
            .get_date(PersonField::Birthdate.as_str())
            .ok_or_else(|| ModelError::decode(PersonField::Birthdate.as_str(), "not a date"))?;
        let gender = record
            .get_bool(PersonField::Gender.as_str())
            .map(Gender::from_bit)
            .ok_or_else(|| ModelError::decode(PersonField::Gender.as_str(), "not a bit"))?;

        Ok(Person {
            person_id,
            first_name: text(PersonField::FirstName)?,
            last_name: text(PersonField::LastName)?,
            birthdate,
            gender,
            town: text(PersonField::Town)?,
        })
    }

    /// Fetch the person with `person_id`.
    ///
    /// # Errors
    ///
    /// `ModelError::NotFound` when no row matches.
    pub fn from_db<S: Store>(
        db: &DatabaseConnection<S>,
        person_id: impl Into<Scalar>,
    ) -> Result<Self, ModelError> {
        let person_id = person_id.into();
        let conditions = FieldMap::new().with(PersonField::PersonId.as_str(), person_id.clone());
        let rows = db.select_by_equality(Self::TABLE_NAME, &conditions)?;
        match rows.first() {
            Some(row) => Self::from_record(row),
            None => Err(ModelError::NotFound {
                table: Self::TABLE_NAME.to_string(),
                key: person_id.to_string(),
            }),
        }
    }

    /// Insert every field except `person_id`, which the table assigns.
    pub fn save<S: Store>(&self, db: &DatabaseConnection<S>) -> Result<u64, ModelError> {
        let mut fields = FieldMap::new();
        for field in PersonField::ALL {
            if field == PersonField::PersonId {
                continue;
            }
            if let Some(value) = self.field(field) {
                fields.insert(field.as_str(), value);
            }
        }
        Ok(db.insert(Self::TABLE_NAME, &fields)?)
    }

    /// Delete this person's row. A person without an id is not stored, so
    /// nothing is deleted.
    pub fn delete<S: Store>(&self, db: &DatabaseConnection<S>) -> Result<u64, ModelError> {
        match self.person_id {
            Some(id) => {
                let conditions = FieldMap::new().with(PersonField::PersonId.as_str(), id);
                Ok(db.delete_by_equality(Self::TABLE_NAME, &conditions)?)
            }
            None => Ok(0),
        }
    }

    pub fn set_person_id(&mut self, person_id: Option<&Scalar>) -> Result<(), ValidationError> {
        let prefix = PersonField::PersonId.prefix();
        self.person_id = match person_id {
            None => None,
            Some(Scalar::Int(id)) => Some(*id),
            Some(Scalar::Text(text)) => {
                validate_numeric(text, &prefix)?;
                let id = text.parse::<i64>().map_err(|_| {
                    ValidationError::new(&prefix, format!("The value {text} is out of range"))
                })?;
                Some(id)
            }
            Some(other @ Scalar::Bool(_)) => {
                return Err(ValidationError::new(
                    &prefix,
                    format!("The value {other} contains non-numeric characters"),
                ))
            }
        };
        Ok(())
    }

    pub fn set_first_name(&mut self, first_name: &str) -> Result<(), ValidationError> {
        self.first_name = validated_name(first_name, PersonField::FirstName)?;
        Ok(())
    }

    pub fn set_last_name(&mut self, last_name: &str) -> Result<(), ValidationError> {
        self.last_name = validated_name(last_name, PersonField::LastName)?;
        Ok(())
    }

    pub fn set_birthdate(&mut self, birthdate: &str) -> Result<(), ValidationError> {
        self.birthdate = parse_date(birthdate, &PersonField::Birthdate.prefix())?;
        Ok(())
    }

    pub fn set_birthdate_date(&mut self, birthdate: NaiveDate) {
        self.birthdate = birthdate;
    }

    pub fn set_gender(&mut self, gender: &Scalar) -> Result<(), ValidationError> {
        self.gender = Gender::from_bit(validate_bit(gender, &PersonField::Gender.prefix())?);
        Ok(())
    }

    pub fn set_town(&mut self, town: &str) -> Result<(), ValidationError> {
        validate_max_length(town, TOWN_MAX_LENGTH, &PersonField::Town.prefix())?;
        self.town = town.to_string();
        Ok(())
    }

    pub fn person_id(&self) -> Option<i64> {
        self.person_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn birthdate(&self) -> NaiveDate {
        self.birthdate
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn town(&self) -> &str {
        &self.town
    }

    /// Value of `field` as it is written to the table. `None` only for an
    /// unset `person_id`.
    pub fn field(&self, field: PersonField) -> Option<Scalar> {
        match field {
            PersonField::PersonId => self.person_id.map(Scalar::Int),
            PersonField::FirstName => Some(Scalar::from(&self.first_name)),
            PersonField::LastName => Some(Scalar::from(&self.last_name)),
            PersonField::Birthdate => Some(Scalar::from(self.birthdate.format("%Y-%m-%d").to_string())),
            PersonField::Gender => Some(Scalar::Bool(self.gender.as_bit())),
            PersonField::Town => Some(Scalar::from(&self.town)),
        }
    }

    /// Every field in declared order
    pub fn fields(&self) -> Vec<Option<Scalar>> {
        PersonField::ALL.into_iter().map(|field| self.field(field)).collect()
    }

    /// Full years since birth, as of today
    pub fn age(&self) -> u32 {
        age_on(self.birthdate, Local::now().date_naive())
    }

    /// Full years since `birthdate` (any format [`parse_date`] accepts), as of today
    pub fn age_of(birthdate: &str) -> Result<u32, ValidationError> {
        let birthdate = parse_date(birthdate, "\"birthdate\" argument")?;
        Ok(age_on(birthdate, Local::now().date_naive()))
    }

    /// `муж` for `0`/`false`, `жен` for `1`/`true`
    pub fn verbose_gender(gender: &Scalar) -> Result<&'static str, ValidationError> {
        validate_bit(gender, "\"gender\" argument").map(|bit| Gender::from_bit(bit).verbose())
    }
}

/// Full years between `birthdate` and `today`; zero for a future birthdate.
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(birthdate).unwrap_or(0)
}

fn validated_name(name: &str, field: PersonField) -> Result<String, ValidationError> {
    let prefix = field.prefix();
    validate_max_length(name, NAME_MAX_LENGTH, &prefix)?;
    validate_alphabetic(name, &prefix)?;
    Ok(name.to_string())
}
