//! Reading a named field from a row through its declared column type.
//!
//! [`read`] is the only way the engine looks at rows. It resolves the field,
//! truncates date-times to calendar days and coerces values whose runtime
//! type differs from the declared one.

use crate::error::{FilterError, Result};
use crate::options::FilterOptions;
use crate::row::{FieldType, Row};
use crate::value::{Number, Value};

/// Reads `field` from `row`, normalized for a column of `field_type`.
///
/// # Errors
///
/// - [`FilterError::UnknownField`] if the row has no such field.
/// - [`FilterError::TypeMismatch`] if the value cannot be represented as the
///   declared type (see [`coerce`]).
pub fn read<'r, R>(
    row: &'r R,
    field: &str,
    field_type: FieldType,
    options: &FilterOptions,
) -> Result<Value<'r>>
where
    R: Row + ?Sized,
{
    let value = row
        .field_value(field)
        .ok_or_else(|| FilterError::UnknownField {
            field: field.to_string(),
        })?;
    coerce(value, field, field_type, options)
}

/// Converts a value to the representation of its declared column type.
///
/// Date-times always become dates. Blank values pass through untouched so
/// they can be reported as blank. Text on numeric, date and boolean columns
/// is parsed; anything else that does not fit raises `TypeMismatch`.
/// String and other columns accept every value.
pub fn coerce<'a>(
    value: Value<'a>,
    field: &str,
    field_type: FieldType,
    options: &FilterOptions,
) -> Result<Value<'a>> {
    let value = value.truncate_date();
    if value.is_blank() {
        return Ok(value);
    }
    let mismatch = |value: &Value<'_>| FilterError::TypeMismatch {
        field: field.to_string(),
        expected: field_type,
        actual: value.type_name(),
    };
    match field_type {
        FieldType::String | FieldType::Other => Ok(value),
        ty if ty.is_numeric() => match value {
            Value::Number(_) => Ok(value),
            Value::String(ref s) => options
                .parse_number(s)
                .map(|n| Value::Number(Number::F64(n)))
                .ok_or_else(|| mismatch(&value)),
            _ => Err(mismatch(&value)),
        },
        FieldType::Date => match value {
            Value::Date(_) => Ok(value),
            Value::String(ref s) => options
                .parse_date(s)
                .map(Value::Date)
                .ok_or_else(|| mismatch(&value)),
            _ => Err(mismatch(&value)),
        },
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(value),
            Value::String(ref s) => s
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| mismatch(&value)),
            _ => Err(mismatch(&value)),
        },
        _ => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn row(pairs: &[(&str, Value<'static>)]) -> BTreeMap<String, Value<'static>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unknown_field() {
        let r = row(&[("a", Value::from(1i64))]);
        let options = FilterOptions::default();
        assert_eq!(
            read(&r, "b", FieldType::Integer, &options),
            Err(FilterError::UnknownField {
                field: "b".to_string()
            })
        );
    }

    #[test]
    fn datetimes_truncate_to_dates() {
        let dt = date(2024, 1, 5).and_hms_opt(13, 45, 0).unwrap();
        let r = row(&[("when", Value::from(dt))]);
        let options = FilterOptions::default();
        assert_eq!(
            read(&r, "when", FieldType::Date, &options),
            Ok(Value::Date(date(2024, 1, 5)))
        );
        // Regardless of the declared type
        assert_eq!(
            read(&r, "when", FieldType::Other, &options),
            Ok(Value::Date(date(2024, 1, 5)))
        );
    }

    #[test]
    fn nulls_and_blanks_pass_through() {
        let r = row(&[("a", Value::Null), ("b", Value::from(""))]);
        let options = FilterOptions::default();
        assert_eq!(read(&r, "a", FieldType::Date, &options), Ok(Value::Null));
        assert_eq!(
            read(&r, "b", FieldType::Integer, &options),
            Ok(Value::from(""))
        );
    }

    #[test]
    fn text_is_coerced_through_declared_type() {
        let r = row(&[
            ("n", Value::from(" 12.5")),
            ("d", Value::from("2024-01-05")),
            ("b", Value::from("True")),
        ]);
        let options = FilterOptions::default();
        assert_eq!(
            read(&r, "n", FieldType::Float, &options),
            Ok(Value::from(12.5f64))
        );
        assert_eq!(
            read(&r, "d", FieldType::Date, &options),
            Ok(Value::Date(date(2024, 1, 5)))
        );
        assert_eq!(
            read(&r, "b", FieldType::Boolean, &options),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn impossible_coercions_are_type_mismatches() {
        let r = row(&[("n", Value::from("abc")), ("d", Value::from(3i64))]);
        let options = FilterOptions::default();
        assert_eq!(
            read(&r, "n", FieldType::Integer, &options),
            Err(FilterError::TypeMismatch {
                field: "n".to_string(),
                expected: FieldType::Integer,
                actual: "string",
            })
        );
        assert!(matches!(
            read(&r, "d", FieldType::Date, &options),
            Err(FilterError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn string_columns_accept_anything() {
        let r = row(&[("n", Value::from(3i64))]);
        let options = FilterOptions::default();
        assert_eq!(
            read(&r, "n", FieldType::String, &options),
            Ok(Value::from(3i64))
        );
    }
}
