//! Type-aware evaluation of one condition against one field value.
//!
//! The rules, by declared column type:
//!
//! | Type | Equality | Ordering | Text match |
//! |------|----------|----------|------------|
//! | String | case-insensitive | never | case-insensitive |
//! | Numeric | `abs(a - b) < epsilon` | exact | never |
//! | Date | calendar day | calendar day | never |
//! | Boolean / other | display form | never | never |
//!
//! A null value satisfies only `NotEquals`. A `None` condition or an empty
//! operand satisfies every non-null value. Nothing here returns an error: an
//! operand or value that cannot be interpreted makes the condition fail.

use chrono::NaiveDate;
use tracing::trace;

use crate::condition::Condition;
use crate::options::{parse_date_with, FilterOptions};
use crate::row::FieldType;
use crate::value::Value;

/// Decides whether `value` satisfies `condition` with the user's `operand`.
///
/// Uses [`FilterOptions::shared_default`]. Callers evaluating many rows
/// should compile the condition once with [`CompiledCondition::compile`].
///
/// ```
/// use gridsift::{evaluate, Condition, FieldType, Value};
///
/// assert!(evaluate(&Value::from("Item A"), "item a", Condition::Equals, FieldType::String));
/// assert!(evaluate(&Value::from(10.5f64), "10.5", Condition::Equals, FieldType::Float));
/// assert!(evaluate(&Value::Null, "x", Condition::NotEquals, FieldType::String));
/// ```
pub fn evaluate(
    value: &Value<'_>,
    operand: &str,
    condition: Condition,
    field_type: FieldType,
) -> bool {
    CompiledCondition::compile(condition, operand, field_type, FilterOptions::shared_default())
        .matches(value)
}

/// A condition whose operand has been parsed for the column's type.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCondition {
    condition: Condition,
    field_type: FieldType,
    operand: Operand,
    epsilon: f64,
    date_formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    /// `None` condition or empty operand.
    Unrestricted,
    /// Lowercased operand for string columns.
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Display form compared for boolean and other columns.
    Literal(String),
    /// Operand could not be parsed for the column's type.
    Invalid,
}

impl CompiledCondition {
    /// Parses `operand` once for `field_type`.
    pub fn compile(
        condition: Condition,
        operand: &str,
        field_type: FieldType,
        options: &FilterOptions,
    ) -> Self {
        let parsed = if condition.is_none() || operand.is_empty() {
            Operand::Unrestricted
        } else {
            match field_type {
                FieldType::String => Operand::Text(operand.to_lowercase()),
                ty if ty.is_numeric() => options
                    .parse_number(operand)
                    .map_or(Operand::Invalid, Operand::Number),
                FieldType::Date => options
                    .parse_date(operand)
                    .map_or(Operand::Invalid, Operand::Date),
                _ => Operand::Literal(operand.to_string()),
            }
        };
        if parsed == Operand::Invalid {
            trace!(%condition, operand, %field_type, "operand does not parse for column type");
        }
        CompiledCondition {
            condition,
            field_type,
            operand: parsed,
            epsilon: options.epsilon,
            date_formats: if field_type == FieldType::Date {
                options.date_formats.clone()
            } else {
                Vec::new()
            },
        }
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns `true` if this condition admits every non-null value.
    pub fn is_unrestricted(&self) -> bool {
        self.operand == Operand::Unrestricted
    }

    /// Returns `true` if the operand failed to parse for the column's type.
    pub fn is_invalid(&self) -> bool {
        self.operand == Operand::Invalid
    }

    /// Evaluates this condition against one field value.
    pub fn matches(&self, value: &Value<'_>) -> bool {
        if value.is_null() {
            return self.condition == Condition::NotEquals;
        }
        match &self.operand {
            Operand::Unrestricted => true,
            Operand::Invalid => false,
            Operand::Text(pattern) => self.match_text(value, pattern),
            Operand::Number(operand) => self.match_number(value, *operand),
            Operand::Date(operand) => self.match_date(value, *operand),
            Operand::Literal(operand) => self.match_literal(value, operand),
        }
    }

    fn match_text(&self, value: &Value<'_>, pattern: &str) -> bool {
        let text = match value {
            Value::String(s) | Value::Other(s) => s.to_lowercase(),
            other => other.to_string().to_lowercase(),
        };
        match self.condition {
            Condition::Equals => text == pattern,
            Condition::NotEquals => text != pattern,
            Condition::Contains => text.contains(pattern),
            Condition::StartsWith => text.starts_with(pattern),
            Condition::EndsWith => text.ends_with(pattern),
            _ => false,
        }
    }

    fn match_number(&self, value: &Value<'_>, operand: f64) -> bool {
        let number = match value {
            Value::Number(n) => n.to_f64(),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(n) => n,
                Err(_) => return false,
            },
            _ => return false,
        };
        match self.condition {
            Condition::Equals => (number - operand).abs() < self.epsilon,
            Condition::NotEquals => (number - operand).abs() >= self.epsilon,
            c if c.is_ordering() => number
                .partial_cmp(&operand)
                .is_some_and(|ordering| c.eval_ordering(ordering)),
            _ => false,
        }
    }

    fn match_date(&self, value: &Value<'_>, operand: NaiveDate) -> bool {
        let date = match value {
            Value::String(s) => match parse_date_with(&self.date_formats, s) {
                Some(d) => d,
                None => return false,
            },
            other => match other.as_date() {
                Some(d) => d,
                None => return false,
            },
        };
        self.condition.eval_ordering(date.cmp(&operand))
    }

    fn match_literal(&self, value: &Value<'_>, operand: &str) -> bool {
        let equal = match value {
            Value::Bool(b) => operand
                .trim()
                .parse::<bool>()
                .map(|o| o == *b)
                .unwrap_or_else(|_| operand.eq_ignore_ascii_case(&b.to_string())),
            other => other.to_string() == operand,
        };
        match self.condition {
            Condition::Equals => equal,
            Condition::NotEquals => !equal,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const ALL: [Condition; 10] = [
        Condition::None,
        Condition::Equals,
        Condition::NotEquals,
        Condition::Contains,
        Condition::StartsWith,
        Condition::EndsWith,
        Condition::GreaterThan,
        Condition::LessThan,
        Condition::GreaterOrEqual,
        Condition::LessOrEqual,
    ];

    #[test]
    fn null_matches_only_not_equals() {
        for ty in [
            FieldType::String,
            FieldType::Integer,
            FieldType::Date,
            FieldType::Other,
        ] {
            for c in ALL {
                let expected = c == Condition::NotEquals;
                assert_eq!(evaluate(&Value::Null, "x", c, ty), expected, "{c} {ty}");
                assert_eq!(evaluate(&Value::Null, "", c, ty), expected, "{c} {ty}");
            }
        }
    }

    #[test]
    fn none_or_empty_operand_admits() {
        let value = Value::from("abc");
        assert!(evaluate(&value, "zzz", Condition::None, FieldType::String));
        assert!(evaluate(&value, "", Condition::Equals, FieldType::String));
        assert!(evaluate(&Value::from(1i64), "", Condition::GreaterThan, FieldType::Integer));
    }

    #[test]
    fn strings_are_case_insensitive() {
        let value = Value::from("Item A");
        assert!(evaluate(&value, "item a", Condition::Equals, FieldType::String));
        assert!(!evaluate(&value, "item a", Condition::NotEquals, FieldType::String));
        assert!(evaluate(&value, "EM", Condition::Contains, FieldType::String));
        assert!(evaluate(&value, "iTeM", Condition::StartsWith, FieldType::String));
        assert!(evaluate(&value, " a", Condition::EndsWith, FieldType::String));
        assert!(!evaluate(&value, "b", Condition::Contains, FieldType::String));
    }

    #[test]
    fn string_ordering_is_rejected() {
        let value = Value::from("b");
        for c in [
            Condition::GreaterThan,
            Condition::LessThan,
            Condition::GreaterOrEqual,
            Condition::LessOrEqual,
        ] {
            assert!(!evaluate(&value, "a", c, FieldType::String));
        }
    }

    #[test]
    fn numeric_equality_tolerates_rounding() {
        let v = Value::from(10.5f64);
        assert!(evaluate(&Value::from(10.500000f64), "10.5", Condition::Equals, FieldType::Float));
        assert!(!evaluate(&v, "10.50001", Condition::Equals, FieldType::Float));
        assert!(evaluate(&v, "10.50001", Condition::NotEquals, FieldType::Float));
        assert!(evaluate(&Value::from(0.1f64 + 0.2f64), "0.3", Condition::Equals, FieldType::Float));
    }

    #[test]
    fn numeric_ordering_is_exact() {
        let v = Value::from(10.5f64);
        assert!(!evaluate(&v, "10.5000001", Condition::GreaterOrEqual, FieldType::Float));
        assert!(evaluate(&v, "10.5000001", Condition::LessThan, FieldType::Float));
        assert!(evaluate(&Value::from(3i32), "2", Condition::GreaterThan, FieldType::Integer));
        assert!(evaluate(&Value::from(3u8), "3", Condition::LessOrEqual, FieldType::Decimal));
    }

    #[test]
    fn numeric_parse_failure_is_false() {
        let v = Value::from(3i64);
        assert!(!evaluate(&v, "three", Condition::Equals, FieldType::Integer));
        assert!(!evaluate(&v, "three", Condition::NotEquals, FieldType::Integer));
        assert!(!evaluate(&v, "3", Condition::Contains, FieldType::Integer));
    }

    #[test]
    fn numeric_nan_never_orders() {
        let v = Value::from(f64::NAN);
        assert!(!evaluate(&v, "1", Condition::GreaterThan, FieldType::Float));
        assert!(!evaluate(&v, "1", Condition::LessThan, FieldType::Float));
    }

    #[test]
    fn date_equality_ignores_time() {
        let dt = date(2024, 1, 5).and_hms_opt(23, 59, 0).unwrap();
        let v = Value::from(dt);
        assert!(evaluate(&v, "2024-01-05", Condition::Equals, FieldType::Date));
        assert!(evaluate(&v, "2024-01-05T00:01:00", Condition::Equals, FieldType::Date));
        assert!(!evaluate(&v, "2024-01-05", Condition::GreaterThan, FieldType::Date));
        assert!(evaluate(&v, "2024-01-04", Condition::GreaterThan, FieldType::Date));
        assert!(evaluate(&v, "2024-01-05", Condition::LessOrEqual, FieldType::Date));
    }

    #[test]
    fn date_parse_failure_is_false() {
        let v = Value::from(date(2024, 1, 5));
        assert!(!evaluate(&v, "soon", Condition::Equals, FieldType::Date));
        assert!(!evaluate(&v, "soon", Condition::NotEquals, FieldType::Date));
        assert!(!evaluate(&v, "2024", Condition::Contains, FieldType::Date));
    }

    #[test]
    fn fallback_types_compare_display_form() {
        let v = Value::from(true);
        assert!(evaluate(&v, "TRUE", Condition::Equals, FieldType::Boolean));
        assert!(evaluate(&v, "false", Condition::NotEquals, FieldType::Boolean));
        assert!(!evaluate(&v, "true", Condition::GreaterThan, FieldType::Boolean));

        let other = Value::other("#ff0000");
        assert!(evaluate(&other, "#ff0000", Condition::Equals, FieldType::Other));
        assert!(!evaluate(&other, "#FF0000", Condition::Equals, FieldType::Other));
        assert!(!evaluate(&other, "#ff", Condition::Contains, FieldType::Other));
    }

    #[test]
    fn mismatched_values_are_coerced_or_rejected() {
        // Numeric column holding text
        assert!(evaluate(&Value::from(" 4 "), "4", Condition::Equals, FieldType::Integer));
        assert!(!evaluate(&Value::from("n/a"), "4", Condition::NotEquals, FieldType::Integer));
        // Date column holding text
        assert!(evaluate(&Value::from("2024-01-05"), "2024-01-05", Condition::Equals, FieldType::Date));
        // String column holding a number
        assert!(evaluate(&Value::from(42i64), "4", Condition::StartsWith, FieldType::String));
    }

    #[test]
    fn compiled_condition_reports_state() {
        let options = FilterOptions::default();
        let c = CompiledCondition::compile(Condition::Equals, "x", FieldType::Integer, &options);
        assert!(c.is_invalid());
        assert!(!c.is_unrestricted());

        let c = CompiledCondition::compile(Condition::None, "x", FieldType::Integer, &options);
        assert!(c.is_unrestricted());
        assert_eq!(c.condition(), Condition::None);
    }

    #[test]
    fn epsilon_is_configurable() {
        let options = FilterOptions {
            epsilon: 0.5,
            ..FilterOptions::default()
        };
        let c = CompiledCondition::compile(Condition::Equals, "10", FieldType::Float, &options);
        assert!(c.matches(&Value::from(10.4f64)));
        assert!(!c.matches(&Value::from(10.5f64)));
    }
}
