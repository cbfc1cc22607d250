//! Lookup suffixes: the operator table and the condition key parser.
//!
//! A condition key is either a bare field name (`town`) or a field name and a
//! lookup joined by `__` (`birthdate__gte`). The lookup selects the comparison
//! operator; a bare field compares with `=`.

use super::{Conditions, QueryError, Scalar};

/// Separator between a field name and its lookup suffix
pub const LOOKUP_DELIMITER: &str = "__";

/// Comparison operator a condition renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    Not,
}

const OPERATOR_TABLE: [(&str, Operator); 5] = [
    ("gt", Operator::Gt),
    ("lt", Operator::Lt),
    ("gte", Operator::Gte),
    ("lte", Operator::Lte),
    ("not", Operator::Not),
];

impl Operator {
    /// Look a suffix token up in the operator table
    pub fn from_lookup(token: &str) -> Option<Self> {
        OPERATOR_TABLE
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, operator)| *operator)
    }

    /// Resolve an optional lookup; `None` means equality.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidLookup` carrying the token when it is not in
    /// the operator table.
    pub fn resolve(lookup: Option<&str>) -> Result<Self, QueryError> {
        match lookup {
            None => Ok(Operator::Eq),
            Some(token) => {
                Self::from_lookup(token).ok_or_else(|| QueryError::InvalidLookup(token.to_string()))
            }
        }
    }

    /// The suffix token for this operator. `None` for [`Operator::Eq`].
    pub fn lookup(self) -> Option<&'static str> {
        OPERATOR_TABLE
            .iter()
            .find(|(_, operator)| *operator == self)
            .map(|(name, _)| *name)
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Not => "!=",
        }
    }
}

/// Split a condition key into its field name and optional lookup.
///
/// Only the first `__` splits; the remainder is returned as-is, so
/// `"a__b__c"` yields the lookup `"b__c"`.
///
/// ```
/// use pglookup::parse_key;
///
/// assert_eq!(parse_key("age__gt"), ("age", Some("gt")));
/// assert_eq!(parse_key("age"), ("age", None));
/// assert_eq!(parse_key("a__b__c"), ("a", Some("b__c")));
/// ```
pub fn parse_key(key: &str) -> (&str, Option<&str>) {
    match key.split_once(LOOKUP_DELIMITER) {
        Some((field, lookup)) => (field, Some(lookup)),
        None => (key, None),
    }
}

/// A condition key split into field and lookup, paired with its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCondition {
    pub field: String,
    pub lookup: Option<String>,
    pub value: Scalar,
}

/// Parse every key of `conditions`, in order. The input is left untouched.
pub fn parse_conditions(conditions: &Conditions) -> Vec<ParsedCondition> {
    conditions
        .iter()
        .map(|(key, value)| {
            let (field, lookup) = parse_key(key);
            ParsedCondition {
                field: field.to_string(),
                lookup: lookup.map(str::to_string),
                value: value.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_with_lookup() {
        assert_eq!(parse_key("a__gt"), ("a", Some("gt")));
        assert_eq!(parse_key("first_name__not"), ("first_name", Some("not")));
    }

    #[test]
    fn test_parse_key_without_lookup() {
        assert_eq!(parse_key("a"), ("a", None));
        assert_eq!(parse_key("first_name"), ("first_name", None));
    }

    #[test]
    fn test_parse_key_does_not_resplit_remainder() {
        // The conjoined token is passed through and rejected later as a lookup.
        assert_eq!(parse_key("a__b__c"), ("a", Some("b__c")));
        assert!(matches!(
            Operator::resolve(Some("b__c")),
            Err(QueryError::InvalidLookup(token)) if token == "b__c"
        ));
    }

    #[test]
    fn test_parse_key_edge_delimiters() {
        assert_eq!(parse_key("__gt"), ("", Some("gt")));
        assert_eq!(parse_key("a__"), ("a", Some("")));
        assert_eq!(parse_key("a_gt"), ("a_gt", None));
    }

    #[test]
    fn test_operator_table_entries() {
        let expected = [
            ("gt", ">"),
            ("lt", "<"),
            ("gte", ">="),
            ("lte", "<="),
            ("not", "!="),
        ];
        for (token, sql) in expected {
            let operator = Operator::from_lookup(token).unwrap();
            assert_eq!(operator.as_sql(), sql, "lookup {token}");
            assert_eq!(operator.lookup(), Some(token));
        }
    }

    #[test]
    fn test_operator_resolve_defaults_to_equality() {
        assert_eq!(Operator::resolve(None).unwrap(), Operator::Eq);
        assert_eq!(Operator::Eq.as_sql(), "=");
        assert_eq!(Operator::Eq.lookup(), None);
    }

    #[test]
    fn test_operator_resolve_rejects_unknown_tokens() {
        for token in ["eq", "like", "GT", "", "in"] {
            assert!(
                matches!(Operator::resolve(Some(token)), Err(QueryError::InvalidLookup(t)) if t == token),
                "token {token:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_conditions_preserves_order_and_values() {
        let conditions = Conditions::new().with("b__lt", 2).with("a", "x").with("c__gte", true);
        let parsed = parse_conditions(&conditions);

        assert_eq!(
            parsed,
            vec![
                ParsedCondition {
                    field: "b".to_string(),
                    lookup: Some("lt".to_string()),
                    value: Scalar::Int(2),
                },
                ParsedCondition {
                    field: "a".to_string(),
                    lookup: None,
                    value: Scalar::from("x"),
                },
                ParsedCondition {
                    field: "c".to_string(),
                    lookup: Some("gte".to_string()),
                    value: Scalar::Bool(true),
                },
            ]
        );
        assert_eq!(conditions.len(), 3);
    }
}
