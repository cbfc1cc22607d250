//! Ordered field and condition maps.

use super::lookup::{Operator, LOOKUP_DELIMITER};
use super::Scalar;

/// An insertion-ordered map from field (or condition) key to value.
///
/// Keys are unique: inserting an existing key replaces its value and keeps
/// its original position. Iteration order drives column order for inserts
/// and predicate order in a filter clause.
///
/// # Example
///
/// ```
/// use pglookup::{Conditions, Operator};
///
/// let conditions = Conditions::new()
///     .with("town", "Oslo")
///     .filter("birthdate", Operator::Gte, "1990-01-01")
///     .filter("person_id", Operator::Not, 7);
///
/// let keys: Vec<&str> = conditions.keys().collect();
/// assert_eq!(keys, vec!["town", "birthdate__gte", "person_id__not"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldMap {
    entries: Vec<(String, Scalar)>,
}

/// A [`FieldMap`] whose keys may carry `__lookup` suffixes
pub type Conditions = FieldMap;

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`FieldMap::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add a comparison on `field`, rendering the key as `field__<lookup>`
    /// (or plain `field` for [`Operator::Eq`]).
    pub fn filter(self, field: &str, operator: Operator, value: impl Into<Scalar>) -> Self {
        let key = match operator.lookup() {
            Some(lookup) => format!("{field}{LOOKUP_DELIMITER}{lookup}"),
            None => field.to_string(),
        };
        self.with(key, value)
    }

    /// Insert or replace `key`. Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<Scalar>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_keeps_insertion_order() {
        let map = FieldMap::new().with("c", 3).with("a", 1).with("b", 2);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_field_map_replace_keeps_position() {
        let mut map = FieldMap::new().with("a", 1).with("b", 2);
        let previous = map.insert("a", 10);

        assert_eq!(previous, Some(Scalar::Int(1)));
        assert_eq!(map.len(), 2);
        let entries: Vec<(&str, &Scalar)> = map.iter().collect();
        assert_eq!(entries, vec![("a", &Scalar::Int(10)), ("b", &Scalar::Int(2))]);
    }

    #[test]
    fn test_filter_builds_lookup_keys() {
        let map = FieldMap::new()
            .filter("age", Operator::Gt, 18)
            .filter("age", Operator::Lte, 65)
            .filter("town", Operator::Eq, "Oslo");

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["age__gt", "age__lte", "town"]);
        assert_eq!(map.get("town"), Some(&Scalar::from("Oslo")));
    }

    #[test]
    fn test_from_iterator_collapses_duplicate_keys() {
        let map: FieldMap = vec![("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&Scalar::Int(3)));
    }
}
