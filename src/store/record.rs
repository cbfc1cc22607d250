//! Fetched rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_query::Value;

/// One fetched row: column names paired with their values, in result order.
///
/// Typed getters are lenient about representation (a `bigint`, an `integer`
/// and the text `"42"` all read back as `42i64`), so model code does not
/// depend on the exact column type a table was declared with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::push`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Append a column. Lookups return the first column with a matching name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Text form of a column. `None` for a missing column or SQL NULL.
    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(Some(s)) => Some(s.clone()),
            Value::Bool(Some(b)) => Some(b.to_string()),
            Value::SmallInt(Some(i)) => Some(i.to_string()),
            Value::Int(Some(i)) => Some(i.to_string()),
            Value::BigInt(Some(i)) => Some(i.to_string()),
            Value::Float(Some(f)) => Some(f.to_string()),
            Value::Double(Some(d)) => Some(d.to_string()),
            Value::ChronoDate(Some(d)) => Some(d.to_string()),
            Value::ChronoDateTime(Some(d)) => Some(d.to_string()),
            Value::ChronoDateTimeUtc(Some(d)) => Some(d.to_rfc3339()),
            Value::Json(Some(j)) => Some(j.to_string()),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            Value::TinyInt(Some(i)) => Some(i64::from(*i)),
            Value::SmallInt(Some(i)) => Some(i64::from(*i)),
            Value::Int(Some(i)) => Some(i64::from(*i)),
            Value::BigInt(Some(i)) => Some(*i),
            Value::String(Some(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            Value::Bool(Some(b)) => Some(*b),
            Value::SmallInt(Some(i)) => bit(i64::from(*i)),
            Value::Int(Some(i)) => bit(i64::from(*i)),
            Value::BigInt(Some(i)) => bit(*i),
            Value::String(Some(s)) => match s.trim() {
                "t" | "true" | "1" => Some(true),
                "f" | "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_date(&self, name: &str) -> Option<NaiveDate> {
        match self.get(name)? {
            Value::ChronoDate(Some(d)) => Some(NaiveDate::clone(d)),
            Value::String(Some(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    /// A `timestamp` column, or a `timestamptz` column in UTC
    pub fn get_datetime(&self, name: &str) -> Option<NaiveDateTime> {
        match self.get(name)? {
            Value::ChronoDateTime(Some(d)) => Some(NaiveDateTime::clone(d)),
            Value::ChronoDateTimeUtc(Some(d)) => Some(d.naive_utc()),
            Value::String(Some(s)) => {
                NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()
            }
            _ => None,
        }
    }

    pub fn get_datetime_utc(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.get(name)? {
            Value::ChronoDateTimeUtc(Some(d)) => Some(DateTime::<Utc>::clone(d)),
            Value::ChronoDateTime(Some(d)) => Some(d.and_utc()),
            _ => None,
        }
    }

    pub fn get_json(&self, name: &str) -> Option<serde_json::Value> {
        match self.get(name)? {
            Value::Json(Some(j)) => Some(serde_json::Value::clone(j)),
            Value::String(Some(s)) => serde_json::from_str(s).ok(),
            _ => None,
        }
    }
}

fn bit(value: i64) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_preserves_column_order() {
        let record = Record::new()
            .with("person_id", 1i64)
            .with("first_name", "Ann")
            .with("town", "Oslo");

        let names: Vec<&str> = record.columns().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["person_id", "first_name", "town"]);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_record_integer_getters_accept_any_width() {
        let record = Record::new()
            .with("small", 7i16)
            .with("int", 8i32)
            .with("big", 9i64)
            .with("text", "10");

        assert_eq!(record.get_i64("small"), Some(7));
        assert_eq!(record.get_i64("int"), Some(8));
        assert_eq!(record.get_i64("big"), Some(9));
        assert_eq!(record.get_i64("text"), Some(10));
        assert_eq!(record.get_i64("missing"), None);
    }

    #[test]
    fn test_record_bool_getter() {
        let record = Record::new()
            .with("flag", true)
            .with("bit", 0i32)
            .with("text", "t")
            .with("bad", 5i32);

        assert_eq!(record.get_bool("flag"), Some(true));
        assert_eq!(record.get_bool("bit"), Some(false));
        assert_eq!(record.get_bool("text"), Some(true));
        assert_eq!(record.get_bool("bad"), None);
    }

    #[test]
    fn test_record_date_getter() {
        let date = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();
        let record = Record::new()
            .with("typed", date)
            .with("text", "2001-02-03")
            .with("junk", "yesterday");

        assert_eq!(record.get_date("typed"), Some(date));
        assert_eq!(record.get_date("text"), NaiveDate::from_ymd_opt(2001, 2, 3));
        assert_eq!(record.get_date("junk"), None);
        assert_eq!(record.get_string("typed").as_deref(), Some("1990-05-17"));
    }

    #[test]
    fn test_record_timestamp_and_json_getters() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 30)
            .unwrap();
        let record = Record::new()
            .with("created_at", at)
            .with("seen_at", at.and_utc())
            .with("tags", serde_json::json!(["a", "b"]));

        assert_eq!(record.get_datetime("created_at"), Some(at));
        assert_eq!(record.get_datetime("seen_at"), Some(at));
        assert_eq!(record.get_datetime_utc("seen_at"), Some(at.and_utc()));
        assert_eq!(record.get_json("tags"), Some(serde_json::json!(["a", "b"])));
        assert_eq!(
            record.get_string("created_at").as_deref(),
            Some("2024-03-09 14:05:30")
        );
        assert_eq!(record.get_string("tags").as_deref(), Some(r#"["a","b"]"#));
    }

    #[test]
    fn test_record_null_reads_as_none() {
        let record = Record::new().with("town", Value::String(None));
        assert!(record.get("town").is_some());
        assert_eq!(record.get_string("town"), None);
    }
}
