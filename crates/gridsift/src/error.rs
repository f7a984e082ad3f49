//! Error types for the gridsift crate.
//!
//! None of these errors escapes row evaluation: predicates degrade them to a
//! pass or a rejection. They surface only from explicit lookups and parsers.

use thiserror::Error;

use crate::row::FieldType;

/// Errors raised while resolving fields or interpreting user input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The field name does not resolve against the row or schema.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// The operand cannot be parsed as the column's type.
    #[error("cannot parse '{operand}' as {expected}")]
    ParseFailure { operand: String, expected: FieldType },

    /// The field holds a value its declared type cannot represent.
    #[error("field '{field}' holds a {actual} value, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: &'static str,
    },

    /// Unrecognized condition name.
    #[error("unknown condition '{0}'")]
    UnknownCondition(String),

    /// Unrecognized field type name.
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),
}

/// Result type for gridsift operations.
pub type Result<T> = std::result::Result<T, FilterError>;
