//! Filter clause builder.

use super::codec::escape_value;
use super::lookup::{parse_key, Operator, LOOKUP_DELIMITER};
use super::{Conditions, QueryError};
use crate::store::Store;
use sea_query::{Value, Values};

/// Quote an identifier with double quotes, doubling any embedded quote
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// One parsed condition ready for the clause builder
///
/// The value is already adapted to its column (see
/// [`crate::store::convert_fields`]), or taken as-is from the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseTerm {
    pub field: String,
    pub lookup: Option<String>,
    pub value: Value,
}

impl ClauseTerm {
    pub fn new(field: impl Into<String>, lookup: Option<&str>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            lookup: lookup.map(str::to_string),
            value: value.into(),
        }
    }

    /// Terms for every key of `conditions`, values unconverted
    pub fn from_conditions(conditions: &Conditions) -> Vec<ClauseTerm> {
        conditions
            .iter()
            .map(|(key, value)| {
                let (field, lookup) = parse_key(key);
                ClauseTerm::new(field, lookup, value)
            })
            .collect()
    }

    fn key(&self) -> String {
        match &self.lookup {
            Some(lookup) => format!("{}{LOOKUP_DELIMITER}{lookup}", self.field),
            None => self.field.clone(),
        }
    }
}

/// A resolved `field <operator> value` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// `WHERE` clause: predicates joined with `AND`, in input order.
///
/// An empty clause renders as the empty string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterClause {
    predicates: Vec<Predicate>,
}

impl FilterClause {
    /// Resolve every term's lookup and collect the predicates in order.
    ///
    /// # Errors
    ///
    /// `QueryError::EmptyField` for a term without a field name and
    /// `QueryError::InvalidLookup` for a lookup outside the operator table.
    /// The first offending term wins.
    pub fn build<I>(terms: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = ClauseTerm>,
    {
        let predicates = terms
            .into_iter()
            .map(|term| {
                if term.field.is_empty() {
                    return Err(QueryError::EmptyField(term.key()));
                }
                let operator = Operator::resolve(term.lookup.as_deref())?;
                Ok(Predicate {
                    field: term.field,
                    operator,
                    value: term.value,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;
        Ok(Self { predicates })
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render with `$n` placeholders; values are returned for binding.
    pub fn to_sql(&self) -> (String, Values) {
        if self.predicates.is_empty() {
            return (String::new(), Values(Vec::new()));
        }
        let fragments: Vec<String> = self
            .predicates
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                format!(
                    "{} {} ${}",
                    quote_identifier(&p.field),
                    p.operator.as_sql(),
                    idx + 1
                )
            })
            .collect();
        let values = self.predicates.iter().map(|p| p.value.clone()).collect();
        (format!("WHERE {}", fragments.join(" AND ")), Values(values))
    }

    /// Render with every value inlined as a literal escaped by `store`.
    ///
    /// # Errors
    ///
    /// Propagates codec failures (`StoreUnavailable`, `UnsupportedValue`).
    pub fn to_inline_sql<S: Store + ?Sized>(&self, store: &S) -> Result<String, QueryError> {
        if self.predicates.is_empty() {
            return Ok(String::new());
        }
        let fragments = self
            .predicates
            .iter()
            .map(|p| {
                Ok(format!(
                    "{} {} {}",
                    quote_identifier(&p.field),
                    p.operator.as_sql(),
                    escape_value(store, &p.value)?
                ))
            })
            .collect::<Result<Vec<String>, QueryError>>()?;
        Ok(format!("WHERE {}", fragments.join(" AND ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockStore;

    fn clause(conditions: &Conditions) -> Result<FilterClause, QueryError> {
        FilterClause::build(ClauseTerm::from_conditions(conditions))
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("first_name"), "\"first_name\"");
        assert_eq!(quote_identifier("order"), "\"order\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_inline_clause_for_mixed_lookups() {
        let store = MockStore::new();
        let conditions = Conditions::new().with("a__gt", 1).with("b__lt", 2).with("c", 6);
        let sql = clause(&conditions).unwrap().to_inline_sql(&store).unwrap();
        assert_eq!(sql, r#"WHERE "a" > 1 AND "b" < 2 AND "c" = 6"#);
    }

    #[test]
    fn test_bound_clause_numbers_placeholders() {
        let conditions = Conditions::new().with("a__gt", 1).with("b__lt", 2).with("c", 6);
        let (sql, values) = clause(&conditions).unwrap().to_sql();
        assert_eq!(sql, r#"WHERE "a" > $1 AND "b" < $2 AND "c" = $3"#);
        assert_eq!(
            values.0,
            vec![Value::from(1i64), Value::from(2i64), Value::from(6i64)]
        );
    }

    #[test]
    fn test_plain_keys_use_equality() {
        let store = MockStore::new();
        let conditions = Conditions::new().with("x", 1).with("y", true).with("z", 3);
        let built = clause(&conditions).unwrap();
        assert!(built.predicates().iter().all(|p| p.operator == Operator::Eq));
        assert_eq!(
            built.to_inline_sql(&store).unwrap(),
            r#"WHERE "x" = 1 AND "y" = true AND "z" = 3"#
        );
    }

    #[test]
    fn test_each_lookup_maps_to_its_operator() {
        let store = MockStore::new();
        let cases = [
            ("gt", ">"),
            ("lt", "<"),
            ("gte", ">="),
            ("lte", "<="),
            ("not", "!="),
        ];
        for (lookup, sql) in cases {
            let conditions = Conditions::new().with(format!("age__{lookup}"), 30);
            let rendered = clause(&conditions).unwrap().to_inline_sql(&store).unwrap();
            assert_eq!(rendered, format!("WHERE \"age\" {sql} 30"));
        }
    }

    #[test]
    fn test_emission_follows_insertion_order() {
        let store = MockStore::new();
        let orderings = [
            vec![("a__gt", 1), ("b__lt", 2), ("c", 3)],
            vec![("c", 3), ("a__gt", 1), ("b__lt", 2)],
            vec![("b__lt", 2), ("c", 3), ("a__gt", 1)],
        ];
        let expected = [
            r#"WHERE "a" > 1 AND "b" < 2 AND "c" = 3"#,
            r#"WHERE "c" = 3 AND "a" > 1 AND "b" < 2"#,
            r#"WHERE "b" < 2 AND "c" = 3 AND "a" > 1"#,
        ];

        let rendered: Vec<String> = orderings
            .iter()
            .map(|pairs| {
                let conditions: Conditions = pairs.iter().copied().collect();
                clause(&conditions).unwrap().to_inline_sql(&store).unwrap()
            })
            .collect();

        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_repeated_field_with_different_lookups() {
        let conditions = Conditions::new().with("age__gte", 18).with("age__lt", 65);
        let (sql, _) = clause(&conditions).unwrap().to_sql();
        assert_eq!(sql, r#"WHERE "age" >= $1 AND "age" < $2"#);
    }

    #[test]
    fn test_empty_conditions_render_nothing() {
        let store = MockStore::new();
        let built = clause(&Conditions::new()).unwrap();
        assert!(built.is_empty());
        assert_eq!(built.to_sql().0, "");
        assert_eq!(built.to_inline_sql(&store).unwrap(), "");
    }

    #[test]
    fn test_unknown_lookup_is_rejected() {
        let conditions = Conditions::new().with("a", 1).with("b__like", "x");
        assert!(matches!(
            clause(&conditions),
            Err(QueryError::InvalidLookup(token)) if token == "like"
        ));
    }

    #[test]
    fn test_conjoined_lookup_is_rejected() {
        let conditions = Conditions::new().with("a__b__c", 1);
        assert!(matches!(
            clause(&conditions),
            Err(QueryError::InvalidLookup(token)) if token == "b__c"
        ));
    }

    #[test]
    fn test_empty_field_is_rejected() {
        let conditions = Conditions::new().with("__gt", 1);
        assert!(matches!(
            clause(&conditions),
            Err(QueryError::EmptyField(key)) if key == "__gt"
        ));
    }

    #[test]
    fn test_inline_strings_are_escaped() {
        let store = MockStore::new();
        let conditions = Conditions::new().with("last_name", "O'Neil").with("town__not", "x");
        let sql = clause(&conditions).unwrap().to_inline_sql(&store).unwrap();
        assert_eq!(sql, r#"WHERE "last_name" = 'O''Neil' AND "town" != 'x'"#);
        assert_eq!(store.escaped(), vec!["O'Neil".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_inline_escape_failure_propagates() {
        let store = MockStore::new().with_escape_failure();
        let conditions = Conditions::new().with("town", "Oslo");
        let err = clause(&conditions).unwrap().to_inline_sql(&store).unwrap_err();
        assert!(matches!(err, QueryError::StoreUnavailable(_)));
    }
}
