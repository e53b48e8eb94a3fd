//! # Transport Coercion
//!
//! Query strings and headers only carry text, so `"5"` has to count as a
//! valid integer. Values are converted to their declared type before
//! structural validation; a string that does not convert is passed through
//! unchanged and fails validation on its own.
//!
//! | declared type       | conversion                                         |
//! |---------------------|----------------------------------------------------|
//! | `number`, `integer` | numeric strings become numbers                     |
//! | `boolean`           | exactly `"true"` / `"false"` become booleans        |
//! | `array`             | split on the collection format, then convert items |
//! | anything else       | unchanged                                          |

use std::borrow::Cow;

use apiguard_core::{DataType, SimpleSchema};
use serde_json::{Number, Value};

/// Convert a transport value to the type `declared` describes.
///
/// Returns the input borrowed when no conversion applies.
pub fn coerce<'v>(value: &'v Value, declared: &SimpleSchema) -> Cow<'v, Value> {
    match declared.data_type {
        Some(DataType::Array) => Cow::Owned(coerce_array(value, declared)),
        data_type => coerce_scalar(value, data_type),
    }
}

fn coerce_scalar(value: &Value, data_type: Option<DataType>) -> Cow<'_, Value> {
    let Value::String(raw) = value else {
        return Cow::Borrowed(value);
    };
    let converted = match data_type {
        Some(t) if t.is_numeric() => parse_number(raw),
        Some(DataType::Boolean) => parse_bool(raw),
        _ => None,
    };
    converted.map_or(Cow::Borrowed(value), Cow::Owned)
}

fn coerce_array(value: &Value, declared: &SimpleSchema) -> Value {
    let elements = match value {
        Value::Array(items) => items.clone(),
        Value::String(raw) => match declared.collection_format().delimiter() {
            Some(delimiter) => raw
                .split(delimiter)
                .map(|part| Value::String(part.to_string()))
                .collect(),
            None => vec![value.clone()],
        },
        other => vec![other.clone()],
    };
    let item_type = declared.item_type();
    Value::Array(
        elements
            .iter()
            .map(|element| coerce_scalar(element, item_type).into_owned())
            .collect(),
    )
}

/// Integral values (`"5"`, `"5.0"`, `"1e3"`) become integers; anything
/// else numeric becomes a float. Non-finite values (`inf`, `NaN`) are not
/// numbers.
fn parse_number(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(Value::from(n));
    }
    let n = trimmed.parse::<f64>().ok().filter(|n| n.is_finite())?;
    integral(n).or_else(|| Number::from_f64(n).map(Value::Number))
}

/// `n` as an integer value, when it has no fractional part and fits.
fn integral(n: f64) -> Option<Value> {
    if n.fract() != 0.0 {
        return None;
    }
    // i64::MAX and u64::MAX round up to 2^63 and 2^64 as f64, so the upper
    // bounds are exclusive.
    if n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else if n >= 0.0 && n < u64::MAX as f64 {
        Some(Value::from(n as u64))
    } else {
        None
    }
}

fn parse_bool(raw: &str) -> Option<Value> {
    match raw {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn declared(value: Value) -> SimpleSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_numeric_strings_become_numbers() {
        let integer = declared(json!({"type": "integer"}));
        assert_eq!(coerce(&json!("5"), &integer).into_owned(), json!(5));
        assert_eq!(coerce(&json!("-17"), &integer).into_owned(), json!(-17));
        assert_eq!(coerce(&json!("5.5"), &integer).into_owned(), json!(5.5));
        assert_eq!(coerce(&json!("5.0"), &integer).into_owned(), json!(5));
        assert_eq!(coerce(&json!("1e3"), &integer).into_owned(), json!(1000));
        assert_eq!(coerce(&json!("-2.0"), &integer).into_owned(), json!(-2));
        assert_eq!(
            coerce(&json!("18446744073709551615"), &integer).into_owned(),
            json!(u64::MAX)
        );
        assert_eq!(coerce(&json!("1e300"), &integer).into_owned(), json!(1e300));

        let number = declared(json!({"type": "number"}));
        assert_eq!(coerce(&json!(" 2.25 "), &number).into_owned(), json!(2.25));
    }

    #[test]
    fn test_non_numeric_strings_pass_through() {
        let number = declared(json!({"type": "number"}));
        for raw in ["abc", "", "NaN", "inf", "5 apples"] {
            let value = json!(raw);
            assert!(matches!(coerce(&value, &number), Cow::Borrowed(_)), "{raw}");
        }
    }

    #[test]
    fn test_typed_values_are_untouched() {
        let number = declared(json!({"type": "number"}));
        let value = json!(23.3);
        assert!(matches!(coerce(&value, &number), Cow::Borrowed(_)));
    }

    #[test]
    fn test_boolean_literals_only() {
        let boolean = declared(json!({"type": "boolean"}));
        assert_eq!(coerce(&json!("true"), &boolean).into_owned(), json!(true));
        assert_eq!(coerce(&json!("false"), &boolean).into_owned(), json!(false));
        assert_eq!(coerce(&json!("TRUE"), &boolean).into_owned(), json!("TRUE"));
        assert_eq!(coerce(&json!("1"), &boolean).into_owned(), json!("1"));
    }

    #[test]
    fn test_array_split_by_collection_format() {
        let cases = [
            ("csv", "1,2,3"),
            ("ssv", "1 2 3"),
            ("tsv", "1\t2\t3"),
            ("pipes", "1|2|3"),
        ];
        for (format, raw) in cases {
            let schema = declared(json!({
                "type": "array",
                "collectionFormat": format,
                "items": {"type": "integer"}
            }));
            assert_eq!(coerce(&json!(raw), &schema).into_owned(), json!([1, 2, 3]), "{format}");
        }
    }

    #[test]
    fn test_array_defaults_to_csv() {
        let schema = declared(json!({"type": "array", "items": {"type": "string"}}));
        assert_eq!(coerce(&json!("a,b"), &schema).into_owned(), json!(["a", "b"]));
    }

    #[test]
    fn test_multi_and_unknown_formats_wrap() {
        for format in ["multi", "semicolons"] {
            let schema = declared(json!({
                "type": "array",
                "collectionFormat": format,
                "items": {"type": "integer"}
            }));
            assert_eq!(coerce(&json!("1,2"), &schema).into_owned(), json!(["1,2"]));
            assert_eq!(coerce(&json!("7"), &schema).into_owned(), json!([7]));
        }
    }

    #[test]
    fn test_existing_sequences_are_not_split() {
        let schema = declared(json!({"type": "array", "items": {"type": "boolean"}}));
        assert_eq!(
            coerce(&json!(["true", "false", "maybe"]), &schema).into_owned(),
            json!([true, false, "maybe"])
        );
    }

    #[test]
    fn test_unconvertible_items_are_kept() {
        let schema = declared(json!({"type": "array", "items": {"type": "integer"}}));
        assert_eq!(coerce(&json!("1,a,3"), &schema).into_owned(), json!([1, "a", 3]));
    }
}
