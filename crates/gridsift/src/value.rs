//! Runtime value types read from rows.
//!
//! The [`Value`] enum represents the value of one field of one row. It borrows
//! from the row where it can, and is turned into an owned `Value<'static>` when
//! it has to outlive the row (excluded-value sets, distinct value lists).
//!
//! Values carry a total order and a hash that agree with each other, so they
//! can be deduplicated in sets and sorted in the natural order of their type:
//! ordinal for strings, numeric for numbers, calendar order for dates.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Runtime value of a field, borrowed from the source row.
///
/// # Example
///
/// ```
/// use gridsift::{Number, Value};
///
/// let name: Value = "Item A".into();
/// let price: Value = 10.5f64.into();
/// let missing: Value = Option::<i64>::None.into();
///
/// assert_eq!(name.as_str(), Some("Item A"));
/// assert_eq!(price.as_number(), Some(Number::F64(10.5)));
/// assert!(missing.is_null());
/// ```
#[derive(Debug, Clone)]
pub enum Value<'a> {
    /// Null, or an empty nullable wrapper.
    Null,
    /// String value.
    String(Cow<'a, str>),
    /// Numeric value (integer, floating point or decimal columns).
    Number(Number),
    /// Boolean value.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time. Truncated to [`Value::Date`] when read through the
    /// field accessor.
    DateTime(NaiveDateTime),
    /// Any other type, carried by its display form.
    Other(Cow<'a, str>),
}

impl<'a> Value<'a> {
    /// Creates a string value.
    pub fn string(s: impl Into<Cow<'a, str>>) -> Self {
        Value::String(s.into())
    }

    /// Creates a value of an unsupported type from its display form.
    pub fn other(s: impl Into<Cow<'a, str>>) -> Self {
        Value::Other(s.into())
    }

    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for the values shown as "blank": null or the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the calendar date, discarding the time of a `DateTime`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            Value::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Replaces a `DateTime` with its calendar date. Other values are unchanged.
    pub fn truncate_date(self) -> Self {
        match self {
            Value::DateTime(dt) => Value::Date(dt.date()),
            other => other,
        }
    }

    /// Reborrows this value without cloning string data.
    pub fn borrowed(&self) -> Value<'_> {
        match self {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(Cow::Borrowed(s)),
            Value::Number(n) => Value::Number(*n),
            Value::Bool(b) => Value::Bool(*b),
            Value::Date(d) => Value::Date(*d),
            Value::DateTime(dt) => Value::DateTime(*dt),
            Value::Other(s) => Value::Other(Cow::Borrowed(s)),
        }
    }

    /// Converts into a value that owns its data.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::Number(n) => Value::Number(n),
            Value::Bool(b) => Value::Bool(b),
            Value::Date(d) => Value::Date(d),
            Value::DateTime(dt) => Value::DateTime(dt),
            Value::Other(s) => Value::Other(Cow::Owned(s.into_owned())),
        }
    }

    /// Returns the name of this value's variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Other(_) => "other",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::Date(_) => 3,
            Value::DateTime(_) => 4,
            Value::String(_) => 5,
            Value::Other(_) => 6,
        }
    }
}

impl PartialEq for Value<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value<'_> {}

impl PartialOrd for Value<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.as_ref().cmp(b.as_ref()),
            (Value::Other(a), Value::Other(b)) => a.as_ref().cmp(b.as_ref()),
            (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::String(s) | Value::Other(s) => s.as_ref().hash(state),
            Value::Number(n) => n.hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) | Value::Other(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Dates serialize as ISO 8601 strings, `Other` as its display form.
impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::String(s) | Value::Other(s) => serializer.serialize_str(s),
            Value::Number(Number::I64(n)) => serializer.serialize_i64(*n),
            Value::Number(Number::U64(n)) => serializer.serialize_u64(*n),
            Value::Number(Number::F64(n)) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            Value::DateTime(dt) => serializer.collect_str(&dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision.
/// Comparisons between different variants go through `i128` for the two
/// integer variants and through `f64` otherwise.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types. `None` when NaN is involved.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some((a as i128).cmp(&(b as i128))),
            (Number::U64(a), Number::I64(b)) => Some((a as i128).cmp(&(b as i128))),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }

    /// Total order used for sorting and set membership. NaN sorts last and
    /// `-0.0` equals `0.0`.
    pub fn total_cmp(self, other: Number) -> Ordering {
        self.compare(other).unwrap_or_else(|| {
            let (a, b) = (self.to_f64(), other.to_f64());
            a.is_nan().cmp(&b.is_nan())
        })
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(*other) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(*other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(*other)
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal numbers of different variants must hash alike.
        let f = self.to_f64();
        let bits = if f == 0.0 {
            0
        } else if f.is_nan() {
            f64::NAN.to_bits()
        } else {
            f.to_bits()
        };
        bits.hash(state);
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Number {
                fn from(n: $t) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl<'a> From<$t> for Value<'a> {
                fn from(n: $t) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )+
    };
}

number_from!(I64, i64, i8, i16, i32, i64, isize);
number_from!(U64, u64, u8, u16, u32, u64, usize);
number_from!(F64, f64, f32, f64);

impl From<Number> for Value<'_> {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::String(Cow::Borrowed(s))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::String(Cow::Owned(s))
    }
}

impl From<bool> for Value<'_> {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NaiveDate> for Value<'_> {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value<'_> {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
