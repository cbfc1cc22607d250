//! Field validators.
//!
//! Each validator takes a message prefix naming the thing being checked
//! (e.g. `"first_name" field`); an empty prefix leaves the message bare.

use crate::query::Scalar;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    prefix: Option<String>,
    message: String,
}

impl ValidationError {
    pub fn new(prefix: &str, message: impl Into<String>) -> Self {
        Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            message: message.into(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ValidationError {}

/// At most `max_length` characters.
pub fn validate_max_length(value: &str, max_length: usize, prefix: &str) -> Result<(), ValidationError> {
    if value.chars().count() > max_length {
        return Err(ValidationError::new(
            prefix,
            format!("The value {value} has length greater than {max_length}"),
        ));
    }
    Ok(())
}

/// Non-empty and letters only.
pub fn validate_alphabetic(value: &str, prefix: &str) -> Result<(), ValidationError> {
    if value.is_empty() || !value.chars().all(char::is_alphabetic) {
        return Err(ValidationError::new(
            prefix,
            format!("The value {value} contains non-alphabetic characters"),
        ));
    }
    Ok(())
}

/// Non-empty and ASCII digits only.
pub fn validate_numeric(value: &str, prefix: &str) -> Result<(), ValidationError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new(
            prefix,
            format!("The value {value} contains non-numeric characters"),
        ));
    }
    Ok(())
}

/// Parse a calendar date from `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339.
/// The time of day, if any, is discarded.
pub fn parse_date(value: &str, prefix: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| {
            ValidationError::new(
                prefix,
                format!("The value {value} cannot be interpreted as datetime"),
            )
        })
}

pub fn validate_datetime(value: &str, prefix: &str) -> Result<(), ValidationError> {
    parse_date(value, prefix).map(|_| ())
}

/// `0`/`1`, `"0"`/`"1"` or a boolean, read as a bit.
pub fn validate_bit(value: &Scalar, prefix: &str) -> Result<bool, ValidationError> {
    match value {
        Scalar::Bool(b) => Ok(*b),
        Scalar::Int(0) => Ok(false),
        Scalar::Int(1) => Ok(true),
        Scalar::Text(s) if s == "0" => Ok(false),
        Scalar::Text(s) if s == "1" => Ok(true),
        other => Err(ValidationError::new(
            prefix,
            format!("The value {other} cannot be interpreted as bit"),
        )),
    }
}
