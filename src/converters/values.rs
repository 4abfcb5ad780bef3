//! Simple value formatting and coercion
//!
//! Builder side: JSON scalars are written as XSD lexical values. Parser
//! side: text is coerced to the JSON value matching the declared kind.
//! Numbers are converted, never rounded or reformatted.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use crate::error::{Error, FieldPath, Result};
use crate::model::ValueKind;

/// Write a JSON value as the text of a simple value
pub fn format_value(value: &Value, kind: &ValueKind, path: &FieldPath) -> Result<String> {
    match (kind, value) {
        (ValueKind::List(item), Value::Array(items)) => {
            let parts = items
                .iter()
                .enumerate()
                .map(|(i, v)| format_value(v, item, &path.index(i)))
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join(" "))
        }
        (_, Value::Array(_)) => Err(Error::type_mismatch(path, "expected a single value, found an array")),
        (_, Value::Object(_)) => Err(Error::type_mismatch(path, "expected a simple value, found an object")),
        (_, Value::Null) => Err(Error::missing(path)),
        (ValueKind::Boolean, Value::Bool(b)) => Ok(b.to_string()),
        (ValueKind::Boolean, Value::String(s)) => match s.trim() {
            "true" | "false" | "1" | "0" => Ok(s.trim().to_string()),
            other => Err(Error::type_mismatch(path, format!("'{}' is not a boolean", other))),
        },
        (ValueKind::Boolean, Value::Number(_)) => {
            Err(Error::type_mismatch(path, "expected a boolean, found a number"))
        }
        (kind, Value::String(s)) if kind.is_numeric() => {
            if is_numeric_text(s, kind) {
                Ok(s.trim().to_string())
            } else {
                Err(Error::type_mismatch(path, format!("'{}' is not a number", s)))
            }
        }
        (kind, Value::Bool(_)) if kind.is_numeric() => {
            Err(Error::type_mismatch(path, "expected a number, found a boolean"))
        }
        (ValueKind::Integer, Value::Number(n)) if !(n.is_i64() || n.is_u64()) => {
            Err(Error::type_mismatch(path, format!("{} is not an integer", n)))
        }
        (_, Value::String(s)) => Ok(s.clone()),
        (_, Value::Number(n)) => Ok(n.to_string()),
        (_, Value::Bool(b)) => Ok(b.to_string()),
    }
}

fn is_numeric_text(text: &str, kind: &ValueKind) -> bool {
    let text = text.trim();
    match kind {
        ValueKind::Integer => is_integer_text(text),
        ValueKind::Decimal => Decimal::from_str(text).is_ok(),
        ValueKind::Float => matches!(text, "INF" | "-INF" | "NaN") || text.parse::<f64>().is_ok(),
        _ => false,
    }
}

/// Coerce the text of a simple value to JSON
pub fn coerce_value(text: &str, kind: &ValueKind, path: &FieldPath) -> Result<Value> {
    let trimmed = text.trim();
    match kind {
        ValueKind::String => Ok(Value::String(text.to_string())),
        ValueKind::Boolean => match trimmed {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(Error::type_mismatch(path, format!("'{}' is not a boolean", trimmed))),
        },
        ValueKind::Integer => integer(trimmed)
            .ok_or_else(|| Error::type_mismatch(path, format!("'{}' is not an integer", trimmed))),
        ValueKind::Decimal => decimal(trimmed)
            .ok_or_else(|| Error::type_mismatch(path, format!("'{}' is not a decimal", trimmed))),
        ValueKind::Float => match trimmed {
            // No JSON number for these
            "INF" | "-INF" | "NaN" => Ok(Value::String(trimmed.to_string())),
            _ => float(trimmed)
                .ok_or_else(|| Error::type_mismatch(path, format!("'{}' is not a float", trimmed))),
        },
        ValueKind::List(item) => trimmed
            .split_whitespace()
            .enumerate()
            .map(|(i, part)| coerce_value(part, item, &path.index(i)))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
    }
}

/// `xs:integer` lexical form: optional sign and at least one digit
pub(crate) fn is_integer_text(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn integer(text: &str) -> Option<Value> {
    let unsigned = text.strip_prefix('+').unwrap_or(text);
    if let Ok(n) = unsigned.parse::<i64>() {
        return Some(Value::Number(n.into()));
    }
    if let Ok(n) = unsigned.parse::<u64>() {
        return Some(Value::Number(n.into()));
    }
    // Out of JSON integer range: keep the digits as text
    is_integer_text(text).then(|| Value::String(unsigned.to_string()))
}

fn decimal(text: &str) -> Option<Value> {
    let value = Decimal::from_str(text).ok()?;
    if value.fract().is_zero() {
        if let Some(n) = value.to_i64() {
            return Some(Value::Number(n.into()));
        }
    }
    value.to_f64().and_then(Number::from_f64).map(Value::Number)
}

fn float(text: &str) -> Option<Value> {
    if !text.contains(['.', 'e', 'E']) {
        if let Some(n @ Value::Number(_)) = integer(text) {
            return Some(n);
        }
    }
    text.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path() -> FieldPath {
        FieldPath::root("value")
    }

    #[test]
    fn test_format_scalars() {
        assert_eq!(format_value(&json!("x"), &ValueKind::String, &path()).unwrap(), "x");
        assert_eq!(format_value(&json!(30), &ValueKind::Integer, &path()).unwrap(), "30");
        assert_eq!(format_value(&json!(1.5), &ValueKind::Decimal, &path()).unwrap(), "1.5");
        assert_eq!(format_value(&json!("12.50"), &ValueKind::Decimal, &path()).unwrap(), "12.50");
        assert_eq!(format_value(&json!(true), &ValueKind::Boolean, &path()).unwrap(), "true");
        assert_eq!(format_value(&json!(7), &ValueKind::String, &path()).unwrap(), "7");
        assert_eq!(
            format_value(&json!([1, 2, 3]), &ValueKind::List(Box::new(ValueKind::Integer)), &path())
                .unwrap(),
            "1 2 3"
        );
    }

    #[test]
    fn test_format_rejects_bad_shapes() {
        assert!(matches!(
            format_value(&json!([1]), &ValueKind::Integer, &path()),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            format_value(&json!({"a": 1}), &ValueKind::String, &path()),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            format_value(&json!("abc"), &ValueKind::Integer, &path()),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_coerce_values() {
        assert_eq!(coerce_value("30", &ValueKind::Integer, &path()).unwrap(), json!(30));
        assert_eq!(coerce_value(" +7 ", &ValueKind::Integer, &path()).unwrap(), json!(7));
        assert_eq!(coerce_value("30", &ValueKind::Decimal, &path()).unwrap(), json!(30));
        assert_eq!(coerce_value("2.25", &ValueKind::Decimal, &path()).unwrap(), json!(2.25));
        assert_eq!(coerce_value("3", &ValueKind::Float, &path()).unwrap(), json!(3));
        assert_eq!(coerce_value("1e3", &ValueKind::Float, &path()).unwrap(), json!(1000.0));
        assert_eq!(coerce_value("INF", &ValueKind::Float, &path()).unwrap(), json!("INF"));
        assert_eq!(coerce_value("1", &ValueKind::Boolean, &path()).unwrap(), json!(true));
        assert_eq!(coerce_value(" a ", &ValueKind::String, &path()).unwrap(), json!(" a "));
        assert_eq!(
            coerce_value("a b", &ValueKind::List(Box::new(ValueKind::String)), &path()).unwrap(),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_integer_kind_rejects_fractions() {
        let age = FieldPath::root("person").child("Age");
        let err = format_value(&json!(1.5), &ValueKind::Integer, &age).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("person/Age"));
        assert_eq!(format_value(&json!(-3), &ValueKind::Integer, &path()).unwrap(), "-3");
        assert_eq!(format_value(&json!(1.5), &ValueKind::Float, &path()).unwrap(), "1.5");
    }

    #[test]
    fn test_big_integers_stay_text() {
        let big = "123456789012345678901234567890";
        let text = format_value(&json!(big), &ValueKind::Integer, &path()).unwrap();
        assert_eq!(text, big);
        assert_eq!(coerce_value(&text, &ValueKind::Integer, &path()).unwrap(), json!(big));
        let negative = "-99999999999999999999";
        assert_eq!(coerce_value(negative, &ValueKind::Integer, &path()).unwrap(), json!(negative));
        assert_eq!(
            coerce_value("18446744073709551615", &ValueKind::Integer, &path()).unwrap(),
            json!(u64::MAX)
        );
        assert!(format_value(&json!("12a"), &ValueKind::Integer, &path()).is_err());
        assert!(coerce_value("1.0", &ValueKind::Integer, &path()).is_err());
        assert!(coerce_value("+", &ValueKind::Integer, &path()).is_err());
    }

    #[test]
    fn test_coerce_reports_path() {
        let err = coerce_value("x", &ValueKind::Integer, &FieldPath::root("person").child("Age"))
            .unwrap_err();
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("person/Age"));
    }
}
