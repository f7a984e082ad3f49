//! Field access capability for rows of any shape.
//!
//! The engine never inspects a row directly. Rows implement [`Row`], which
//! resolves a field name to a [`Value`], and statically shaped rows also
//! implement [`TypedRow`] to describe their columns. Both are usually
//! generated with `#[derive(Row)]` from `gridsift-macros`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::value::Value;

/// A record whose fields can be read by name.
///
/// # Manual Implementation
///
/// ```
/// use gridsift::{Row, Value};
///
/// struct Product {
///     name: String,
///     price: f64,
/// }
///
/// impl Row for Product {
///     fn field_value(&self, field: &str) -> Option<Value<'_>> {
///         match field {
///             "name" => Some(Value::from(self.name.as_str())),
///             "price" => Some(Value::from(self.price)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Row {
    /// Returns the value of a field.
    ///
    /// `None` means the name does not resolve against this row. A field that
    /// exists but holds nothing returns `Some(Value::Null)`.
    fn field_value(&self, field: &str) -> Option<Value<'_>>;
}

/// A row type with a fixed, discoverable set of columns.
pub trait TypedRow: Row {
    /// Describes the columns of this row type.
    fn schema() -> Schema;
}

impl<T: Row + ?Sized> Row for &T {
    fn field_value(&self, field: &str) -> Option<Value<'_>> {
        (**self).field_value(field)
    }
}

impl<T: Row + ?Sized> Row for Box<T> {
    fn field_value(&self, field: &str) -> Option<Value<'_>> {
        (**self).field_value(field)
    }
}

impl Row for BTreeMap<String, Value<'static>> {
    fn field_value(&self, field: &str) -> Option<Value<'_>> {
        self.get(field).map(Value::borrowed)
    }
}

impl Row for HashMap<String, Value<'static>> {
    fn field_value(&self, field: &str) -> Option<Value<'_>> {
        self.get(field).map(Value::borrowed)
    }
}

/// Conversion of a struct field into a [`Value`].
///
/// Used by `#[derive(Row)]`. `Option<T>` maps `None` to [`Value::Null`], which
/// is how nullable columns are unwrapped.
pub trait AsValue {
    /// Returns the field as a value borrowing from `self`.
    fn as_value(&self) -> Value<'_>;
}

impl AsValue for String {
    fn as_value(&self) -> Value<'_> {
        Value::from(self.as_str())
    }
}

impl AsValue for str {
    fn as_value(&self) -> Value<'_> {
        Value::from(self)
    }
}

impl AsValue for bool {
    fn as_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl AsValue for NaiveDate {
    fn as_value(&self) -> Value<'_> {
        Value::Date(*self)
    }
}

impl AsValue for NaiveDateTime {
    fn as_value(&self) -> Value<'_> {
        Value::DateTime(*self)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(&self) -> Value<'_> {
        self.as_ref().map_or(Value::Null, AsValue::as_value)
    }
}

impl<T: AsValue + ?Sized> AsValue for &T {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}

impl<T: AsValue + ?Sized> AsValue for Box<T> {
    fn as_value(&self) -> Value<'_> {
        (**self).as_value()
    }
}

macro_rules! numeric_as_value {
    ($($t:ty),+) => {
        $(
            impl AsValue for $t {
                fn as_value(&self) -> Value<'_> {
                    Value::from(*self)
                }
            }
        )+
    };
}

numeric_as_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Declared type of a column. Nullable columns use their underlying type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    Other,
}

impl FieldType {
    /// Returns `true` for integer, floating point and decimal columns.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float | FieldType::Decimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Other => "other",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Ok(FieldType::String),
            "integer" | "int" => Ok(FieldType::Integer),
            "float" | "double" => Ok(FieldType::Float),
            "decimal" => Ok(FieldType::Decimal),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "date" | "datetime" => Ok(FieldType::Date),
            "other" => Ok(FieldType::Other),
            _ => Err(FilterError::UnknownFieldType(s.to_string())),
        }
    }
}

/// Name and declared type of one column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldDescriptor {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered set of column descriptors.
///
/// ```
/// use gridsift::{FieldType, Schema};
///
/// let schema = Schema::default()
///     .field("name", FieldType::String)
///     .field("price", FieldType::Float);
///
/// assert_eq!(schema.field_type("price"), Some(FieldType::Float));
/// assert_eq!(schema.field_type("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Schema { fields }
    }

    /// Adds a column, replacing any column with the same name.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let descriptor = FieldDescriptor::new(name, field_type);
        match self.fields.iter_mut().find(|f| f.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.fields.push(descriptor),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_type(&self, name: &str) -> Option<FieldType> {
        self.get(name).map(|f| f.field_type)
    }

    /// Resolves a column, failing with [`FilterError::UnknownField`].
    pub fn require(&self, name: &str) -> Result<&FieldDescriptor, FilterError> {
        self.get(name).ok_or_else(|| FilterError::UnknownField {
            field: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Number;

    struct Product {
        name: String,
        price: Option<f64>,
    }

    impl Row for Product {
        fn field_value(&self, field: &str) -> Option<Value<'_>> {
            match field {
                "name" => Some(self.name.as_value()),
                "price" => Some(self.price.as_value()),
                _ => None,
            }
        }
    }

    #[test]
    fn manual_row_impl() {
        let row = Product {
            name: "Item A".to_string(),
            price: None,
        };
        assert_eq!(row.field_value("name"), Some(Value::from("Item A")));
        assert_eq!(row.field_value("price"), Some(Value::Null));
        assert_eq!(row.field_value("unknown"), None);
    }

    #[test]
    fn reference_rows_delegate() {
        let row = Product {
            name: "x".to_string(),
            price: Some(2.5),
        };
        let by_ref: &Product = &row;
        assert_eq!(
            Row::field_value(&by_ref, "price"),
            Some(Value::Number(Number::F64(2.5)))
        );
    }

    #[test]
    fn map_rows() {
        let mut row = BTreeMap::new();
        row.insert("name".to_string(), Value::from("a").into_owned());
        assert_eq!(row.field_value("name"), Some(Value::from("a")));
        assert_eq!(row.field_value("other"), None);
    }

    #[test]
    fn schema_replaces_duplicate_names() {
        let schema = Schema::default()
            .field("a", FieldType::String)
            .field("a", FieldType::Integer);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.field_type("a"), Some(FieldType::Integer));
    }

    #[test]
    fn schema_require_reports_unknown_field() {
        let schema = Schema::default().field("a", FieldType::String);
        assert_eq!(
            schema.require("b"),
            Err(FilterError::UnknownField {
                field: "b".to_string()
            })
        );
    }

    #[test]
    fn field_type_parsing() {
        assert_eq!("Float".parse::<FieldType>().unwrap(), FieldType::Float);
        assert_eq!("datetime".parse::<FieldType>().unwrap(), FieldType::Date);
        assert!("blob".parse::<FieldType>().is_err());
        assert!(FieldType::Decimal.is_numeric());
        assert!(!FieldType::Date.is_numeric());
    }
}
