//! Proc macros for gridsift.
//!
//! # Available Macros
//!
//! - [`Row`] - Generate the `Row` and `TypedRow` implementations of a struct
//!   from its fields and `#[row(...)]` annotations

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod row;

/// Derives `gridsift::Row` and `gridsift::TypedRow` for a struct.
///
/// Every named field becomes a column unless marked `#[row(skip)]`. The
/// column type is inferred for strings, integers, floats, `bool`, chrono
/// dates and date-times, and `Option`/`Box`/reference wrappers of these.
/// Other field types need an explicit column type.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `String` | Text column (Contains, StartsWith, EndsWith, Equals, NotEquals) |
/// | `Integer`, `Float`, `Decimal` | Numeric column (Equals, NotEquals, ordering) |
/// | `Date` | Date column, grouped by year, month and day in check-lists |
/// | `Boolean` | Boolean column |
/// | `Other` | Any `Display` type, filtered on its display form |
/// | `skip` | Leave the field out |
/// | `rename = "..."` | Use a custom column name |
/// | `ty = "..."` | Column type as a string literal |
///
/// Fields of a non-`Other` type must implement `gridsift::AsValue`.
///
/// # Generated Code
///
/// 1. Column name constants (e.g., `Item::NAME`, `Item::CREATED_DATE`)
/// 2. `Row::field_value()` matching on column names
/// 3. `TypedRow::schema()` listing the columns in field order
///
/// # Example
///
/// ```ignore
/// use chrono::NaiveDateTime;
/// use gridsift::{FieldType, TypedRow};
/// use gridsift_macros::Row;
///
/// #[derive(Row)]
/// struct Item {
///     id: i32,
///     name: String,
///     #[row(Decimal)]
///     price: f64,
///     created_date: NaiveDateTime,
///     #[row(skip)]
///     selected: bool,
/// }
///
/// let schema = Item::schema();
/// assert_eq!(schema.field_type(Item::PRICE), Some(FieldType::Decimal));
/// assert_eq!(schema.field_type("selected"), None);
/// ```
#[proc_macro_derive(Row, attributes(row))]
pub fn row_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    row::row_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
