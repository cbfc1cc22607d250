//! Value codec: render values as SQL literals.
//!
//! String escaping is always delegated to [`Store::escape_literal`]; nothing
//! here quotes text by hand.

use super::{QueryError, Scalar};
use crate::store::Store;
use sea_query::Value;

/// Render `value` as a SQL literal.
///
/// Text, dates, timestamps and JSON go through the store's escaping
/// primitive. Numbers and booleans render as their literal text, NULLs as
/// `NULL`.
///
/// # Errors
///
/// `QueryError::StoreUnavailable` if the store cannot escape, and
/// `QueryError::UnsupportedValue` for value kinds with no literal form here.
pub fn escape_value<S: Store + ?Sized>(store: &S, value: &Value) -> Result<String, QueryError> {
    let literal = match value {
        Value::String(Some(s)) => return escape_text(store, s),
        Value::ChronoDate(Some(d)) => return escape_text(store, &d.to_string()),
        Value::ChronoDateTime(Some(d)) => return escape_text(store, &d.to_string()),
        Value::ChronoDateTimeUtc(Some(d)) => return escape_text(store, &d.to_rfc3339()),
        Value::Json(Some(j)) => {
            let text = serde_json::to_string(j)
                .map_err(|e| QueryError::UnsupportedValue(format!("JSON: {e}")))?;
            return escape_text(store, &text);
        }
        Value::Bool(Some(b)) => b.to_string(),
        Value::TinyInt(Some(i)) => i.to_string(),
        Value::SmallInt(Some(i)) => i.to_string(),
        Value::Int(Some(i)) => i.to_string(),
        Value::BigInt(Some(i)) => i.to_string(),
        Value::TinyUnsigned(Some(u)) => u.to_string(),
        Value::SmallUnsigned(Some(u)) => u.to_string(),
        Value::Unsigned(Some(u)) => u.to_string(),
        Value::BigUnsigned(Some(u)) => u.to_string(),
        Value::Float(Some(f)) if f.is_finite() => f.to_string(),
        Value::Double(Some(d)) if d.is_finite() => d.to_string(),
        Value::Float(Some(f)) => non_finite(f64::from(*f), "float4"),
        Value::Double(Some(d)) => non_finite(*d, "float8"),
        Value::Bool(None)
        | Value::TinyInt(None)
        | Value::SmallInt(None)
        | Value::Int(None)
        | Value::BigInt(None)
        | Value::TinyUnsigned(None)
        | Value::SmallUnsigned(None)
        | Value::Unsigned(None)
        | Value::BigUnsigned(None)
        | Value::Float(None)
        | Value::Double(None)
        | Value::String(None)
        | Value::ChronoDate(None)
        | Value::ChronoDateTime(None)
        | Value::ChronoDateTimeUtc(None)
        | Value::Json(None) => "NULL".to_string(),
        other => return Err(QueryError::UnsupportedValue(format!("{other:?}"))),
    };
    Ok(literal)
}

/// [`escape_value`] for a caller-supplied scalar
pub fn escape_scalar<S: Store + ?Sized>(store: &S, value: &Scalar) -> Result<String, QueryError> {
    escape_value(store, &Value::from(value))
}

/// NaN and the infinities have no numeric literal; they render as typed
/// string constants.
fn non_finite(value: f64, type_name: &str) -> String {
    if value.is_nan() {
        format!("'NaN'::{type_name}")
    } else if value.is_sign_negative() {
        format!("'-Infinity'::{type_name}")
    } else {
        format!("'Infinity'::{type_name}")
    }
}

fn escape_text<S: Store + ?Sized>(store: &S, text: &str) -> Result<String, QueryError> {
    store
        .escape_literal(text)
        .map_err(QueryError::StoreUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockStore;
    use chrono::NaiveDate;

    #[test]
    fn test_numbers_and_booleans_pass_through() {
        let store = MockStore::new();
        assert_eq!(escape_value(&store, &Value::from(42i32)).unwrap(), "42");
        assert_eq!(escape_value(&store, &Value::from(-7i64)).unwrap(), "-7");
        assert_eq!(escape_value(&store, &Value::from(true)).unwrap(), "true");
        assert_eq!(escape_value(&store, &Value::from(1.5f64)).unwrap(), "1.5");
        assert!(store.escaped().is_empty());
    }

    #[test]
    fn test_strings_use_store_escaping() {
        let store = MockStore::new();
        assert_eq!(escape_value(&store, &Value::from("it's")).unwrap(), "'it''s'");
        assert_eq!(store.escaped(), vec!["it's".to_string()]);
    }

    #[test]
    fn test_dates_render_as_escaped_text() {
        let store = MockStore::new();
        let date = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(escape_value(&store, &Value::from(date)).unwrap(), "'2023-01-31'");
    }

    #[test]
    fn test_non_finite_floats_render_as_typed_constants() {
        let store = MockStore::new();
        assert_eq!(escape_value(&store, &Value::from(f64::NAN)).unwrap(), "'NaN'::float8");
        assert_eq!(
            escape_value(&store, &Value::from(f64::INFINITY)).unwrap(),
            "'Infinity'::float8"
        );
        assert_eq!(
            escape_value(&store, &Value::from(f64::NEG_INFINITY)).unwrap(),
            "'-Infinity'::float8"
        );
        assert_eq!(escape_value(&store, &Value::from(f32::NAN)).unwrap(), "'NaN'::float4");
        assert_eq!(escape_value(&store, &Value::from(0.25f32)).unwrap(), "0.25");
        assert!(store.escaped().is_empty());
    }

    #[test]
    fn test_timestamps_and_json_use_store_escaping() {
        let store = MockStore::new();
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 30)
            .unwrap();
        assert_eq!(
            escape_value(&store, &Value::from(at)).unwrap(),
            "'2024-03-09 14:05:30'"
        );
        assert_eq!(
            escape_value(&store, &Value::from(at.and_utc())).unwrap(),
            "'2024-03-09T14:05:30+00:00'"
        );
        assert_eq!(
            escape_value(&store, &Value::from(serde_json::json!({"name": "O'Hara"}))).unwrap(),
            r#"'{"name":"O''Hara"}'"#
        );
        assert_eq!(escape_value(&store, &Value::Json(None)).unwrap(), "NULL");
    }

    #[test]
    fn test_nulls_render_as_null() {
        let store = MockStore::new();
        assert_eq!(escape_value(&store, &Value::Int(None)).unwrap(), "NULL");
        assert_eq!(escape_value(&store, &Value::String(None)).unwrap(), "NULL");
    }

    #[test]
    fn test_scalar_escaping() {
        let store = MockStore::new();
        assert_eq!(escape_scalar(&store, &Scalar::from(3)).unwrap(), "3");
        assert_eq!(escape_scalar(&store, &Scalar::from("3")).unwrap(), "'3'");
        assert_eq!(escape_scalar(&store, &Scalar::from(false)).unwrap(), "false");
    }

    #[test]
    fn test_escape_failure_is_store_unavailable() {
        let store = MockStore::new().with_escape_failure();
        let err = escape_value(&store, &Value::from("x")).unwrap_err();
        assert!(matches!(err, QueryError::StoreUnavailable(_)));

        // Non-text values never reach the store.
        assert_eq!(escape_value(&store, &Value::from(1i32)).unwrap(), "1");
    }
}
