//! Implementation of the `#[derive(Row)]` macro.
//!
//! Generates the field accessor, the schema and field name constants from
//! struct annotations.

mod attrs;
mod derive;

pub use derive::row_derive_impl;
