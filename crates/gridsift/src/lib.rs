//! Gridsift - Multi-column filtering engine for in-memory row collections.
//!
//! Gridsift is the engine behind spreadsheet-style column filters. Each
//! column can hide rows two ways at once:
//!
//! - A check-list of the column's distinct values, where unchecked values
//!   are hidden
//! - A condition such as "contains", "greater than" or "not equals" with a
//!   typed operand
//!
//! Column filters live in a [`FilterRegistry`] and combine with AND: a row
//! is visible when every column admits it.
//!
//! # Quick Start
//!
//! ```rust
//! use gridsift::{
//!     Condition, FieldType, FilterRegistry, FilterSpec, Row, Value,
//! };
//!
//! struct Product {
//!     name: String,
//!     price: f64,
//! }
//!
//! impl Row for Product {
//!     fn field_value(&self, field: &str) -> Option<Value<'_>> {
//!         match field {
//!             "name" => Some(Value::string(self.name.as_str())),
//!             "price" => Some(Value::from(self.price)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let products = vec![
//!     Product { name: "Item A".into(), price: 10.5 },
//!     Product { name: "Item B".into(), price: 23.0 },
//!     Product { name: "Other".into(), price: 5.0 },
//! ];
//!
//! let mut name = FilterSpec::new("name", FieldType::String);
//! name.set_condition(Condition::StartsWith);
//! name.set_operand("item");
//!
//! let mut price = FilterSpec::new("price", FieldType::Float);
//! price.exclude(Value::from(23.0));
//!
//! let mut registry = FilterRegistry::new();
//! registry.set_filter(name);
//! registry.set_filter(price);
//!
//! let visible = registry.snapshot().filter(&products);
//! assert_eq!(visible.len(), 1);
//! assert_eq!(visible[0].name, "Item A");
//! ```
//!
//! Structs can derive [`Row`] and [`TypedRow`] with `gridsift-macros`.
//!
//! # Condition Semantics
//!
//! | Column type | Conditions | Comparison |
//! |-------------|------------|------------|
//! | String | `Equals`, `NotEquals`, `Contains`, `StartsWith`, `EndsWith` | Case-insensitive |
//! | Integer, Float, Decimal | `Equals`, `NotEquals`, `GreaterThan`, `LessThan`, `GreaterOrEqual`, `LessOrEqual` | Equality within `1e-6`, ordering exact |
//! | Date | Same as numbers | Calendar day, time of day ignored |
//! | Boolean, Other | none | - |
//!
//! [`Condition::available_for`] lists the conditions a column type offers.
//! Boolean and other columns offer none and are filtered through their
//! check-list only. A condition set on them anyway is evaluated as
//! `Equals`/`NotEquals` on the display form.
//!
//! A null value satisfies `NotEquals` and nothing else. An operand that
//! does not parse for the column type matches nothing.
//!
//! # Errors During Evaluation
//!
//! Row evaluation never fails. A row that lacks a filtered field passes
//! that column; a value that cannot be read as the column's type fails the
//! column's condition. See [`FilterError`] for the cases explicit APIs
//! report.
//!
//! # Check-lists and Date Trees
//!
//! [`distinct::collect`] scans a column, [`checklist`] turns the result into
//! check-list entries and [`GroupNode::build`] groups date entries by year,
//! month and day. [`FilterSession`] wires these together the way a grid
//! does when the user opens, edits and applies a column filter.

mod accessor;
mod condition;
pub mod distinct;
mod error;
mod evaluate;
mod items;
mod options;
mod registry;
mod row;
mod search;
mod session;
mod spec;
mod tree;
mod value;

// Re-export public API
pub use accessor::{coerce, read};
pub use condition::Condition;
pub use distinct::DistinctValues;
pub use error::{FilterError, Result};
pub use evaluate::{evaluate, CompiledCondition};
pub use items::{checklist, excluded_values, set_all, sync_all, FilterItem, ItemLevel};
pub use options::{FilterOptions, Labels};
pub use registry::{FilterRegistry, RegistrySnapshot};
pub use row::{AsValue, FieldDescriptor, FieldType, Row, Schema, TypedRow};
pub use search::{narrowed_tree, search_items, ItemSearch, SearchMode};
pub use session::{ColumnFilter, FilterSession};
pub use spec::{ColumnPredicate, FilterSpec};
pub use tree::{GroupLevel, GroupNode};
pub use value::{Number, Value};
