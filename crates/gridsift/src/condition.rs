//! Conditions a user can put on a column.
//!
//! The [`Condition`] enum lists every operator of the conditional filter.
//! Not all conditions are meaningful for all column types; see
//! [`Condition::available_for`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::row::FieldType;

/// Operator of a conditional column filter.
///
/// - **No restriction**: `None`
/// - **Universal**: `Equals`, `NotEquals`
/// - **String**: `Contains`, `StartsWith`, `EndsWith`
/// - **Numeric/Date**: `GreaterThan`, `LessThan`, `GreaterOrEqual`, `LessOrEqual`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// No conditional restriction; the operand is ignored.
    #[default]
    None,
    Equals,
    NotEquals,
    Contains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
}

const STRING_CONDITIONS: &[Condition] = &[
    Condition::None,
    Condition::Contains,
    Condition::Equals,
    Condition::NotEquals,
    Condition::StartsWith,
    Condition::EndsWith,
];

const ORDERED_CONDITIONS: &[Condition] = &[
    Condition::None,
    Condition::Equals,
    Condition::NotEquals,
    Condition::GreaterThan,
    Condition::LessThan,
    Condition::GreaterOrEqual,
    Condition::LessOrEqual,
];

const NO_CONDITIONS: &[Condition] = &[Condition::None];

impl Condition {
    /// Returns `true` for `Condition::None`.
    pub fn is_none(self) -> bool {
        matches!(self, Condition::None)
    }

    /// Returns `true` for the four ordering comparisons.
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Condition::GreaterThan
                | Condition::LessThan
                | Condition::GreaterOrEqual
                | Condition::LessOrEqual
        )
    }

    /// Conditions offered for a column of the given type, `None` first.
    pub fn available_for(field_type: FieldType) -> &'static [Condition] {
        match field_type {
            FieldType::String => STRING_CONDITIONS,
            FieldType::Integer | FieldType::Float | FieldType::Decimal | FieldType::Date => {
                ORDERED_CONDITIONS
            }
            FieldType::Boolean | FieldType::Other => NO_CONDITIONS,
        }
    }

    /// Evaluates this condition given the ordering of value against operand.
    ///
    /// Returns `false` for conditions that are not comparisons.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Condition::Equals => ordering == Ordering::Equal,
            Condition::NotEquals => ordering != Ordering::Equal,
            Condition::GreaterThan => ordering == Ordering::Greater,
            Condition::GreaterOrEqual => ordering != Ordering::Less,
            Condition::LessThan => ordering == Ordering::Less,
            Condition::LessOrEqual => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the display name of this condition.
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::None => "none",
            Condition::Equals => "equals",
            Condition::NotEquals => "not_equals",
            Condition::Contains => "contains",
            Condition::StartsWith => "starts_with",
            Condition::EndsWith => "ends_with",
            Condition::GreaterThan => "greater_than",
            Condition::LessThan => "less_than",
            Condition::GreaterOrEqual => "greater_or_equal",
            Condition::LessOrEqual => "less_or_equal",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = FilterError;

    /// Accepts the display names (with `_` or `-`) and the symbols
    /// `=`, `!=`, `>`, `<`, `>=`, `<=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let condition = match normalized.as_str() {
            "none" | "" => Condition::None,
            "equals" | "eq" | "=" | "==" => Condition::Equals,
            "not_equals" | "ne" | "!=" | "<>" => Condition::NotEquals,
            "contains" => Condition::Contains,
            "starts_with" | "startswith" => Condition::StartsWith,
            "ends_with" | "endswith" => Condition::EndsWith,
            "greater_than" | "gt" | ">" => Condition::GreaterThan,
            "less_than" | "lt" | "<" => Condition::LessThan,
            "greater_or_equal" | "gte" | ">=" => Condition::GreaterOrEqual,
            "less_or_equal" | "lte" | "<=" => Condition::LessOrEqual,
            _ => return Err(FilterError::UnknownCondition(s.to_string())),
        };
        Ok(condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditions_per_field_type() {
        let strings = Condition::available_for(FieldType::String);
        assert_eq!(strings[0], Condition::None);
        assert!(strings.contains(&Condition::Contains));
        assert!(!strings.contains(&Condition::GreaterThan));

        for ty in [
            FieldType::Integer,
            FieldType::Float,
            FieldType::Decimal,
            FieldType::Date,
        ] {
            let conditions = Condition::available_for(ty);
            assert_eq!(conditions[0], Condition::None);
            assert!(conditions.contains(&Condition::LessOrEqual));
            assert!(!conditions.contains(&Condition::Contains));
        }

        assert_eq!(
            Condition::available_for(FieldType::Boolean),
            &[Condition::None]
        );
        assert_eq!(
            Condition::available_for(FieldType::Other),
            &[Condition::None]
        );
    }

    #[test]
    fn eval_ordering() {
        assert!(Condition::Equals.eval_ordering(Ordering::Equal));
        assert!(!Condition::Equals.eval_ordering(Ordering::Less));

        assert!(Condition::NotEquals.eval_ordering(Ordering::Greater));
        assert!(!Condition::NotEquals.eval_ordering(Ordering::Equal));

        assert!(Condition::GreaterThan.eval_ordering(Ordering::Greater));
        assert!(!Condition::GreaterThan.eval_ordering(Ordering::Equal));

        assert!(Condition::GreaterOrEqual.eval_ordering(Ordering::Equal));
        assert!(!Condition::GreaterOrEqual.eval_ordering(Ordering::Less));

        assert!(Condition::LessThan.eval_ordering(Ordering::Less));
        assert!(!Condition::LessThan.eval_ordering(Ordering::Equal));

        assert!(Condition::LessOrEqual.eval_ordering(Ordering::Equal));
        assert!(!Condition::LessOrEqual.eval_ordering(Ordering::Greater));

        // Not comparisons
        assert!(!Condition::Contains.eval_ordering(Ordering::Equal));
        assert!(!Condition::None.eval_ordering(Ordering::Equal));
    }

    #[test]
    fn parse_names_and_symbols() {
        assert_eq!("equals".parse::<Condition>(), Ok(Condition::Equals));
        assert_eq!("starts-with".parse::<Condition>(), Ok(Condition::StartsWith));
        assert_eq!(">=".parse::<Condition>(), Ok(Condition::GreaterOrEqual));
        assert_eq!("<>".parse::<Condition>(), Ok(Condition::NotEquals));
        assert_eq!(
            "like".parse::<Condition>(),
            Err(FilterError::UnknownCondition("like".to_string()))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for condition in [
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
        ] {
            assert_eq!(condition.to_string().parse::<Condition>(), Ok(condition));
        }
    }
}
