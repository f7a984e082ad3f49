//! Per-column filter state and the predicate built from it.
//!
//! A [`FilterSpec`] holds everything the user chose for one column: the set
//! of unchecked (excluded) values and an optional condition with its operand.
//! [`FilterSpec::to_predicate`] turns that state into a [`ColumnPredicate`]
//! that can be evaluated against rows from any thread.

use std::collections::HashSet;
use std::sync::Arc;

use crate::accessor;
use crate::condition::Condition;
use crate::error::{FilterError, Result};
use crate::evaluate::CompiledCondition;
use crate::options::FilterOptions;
use crate::row::{FieldDescriptor, FieldType, Row};
use crate::value::Value;

/// Filter state of one column.
///
/// # Example
///
/// ```
/// use gridsift::{Condition, FieldType, FilterOptions, FilterSpec, Value};
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
///
/// let mut spec = FilterSpec::new("price", FieldType::Float);
/// spec.set_condition(Condition::GreaterThan);
/// spec.set_operand("20");
/// spec.exclude(Value::from(45.2f64));
///
/// let predicate = spec.to_predicate(&Arc::new(FilterOptions::default()));
///
/// let mut row = BTreeMap::new();
/// row.insert("price".to_string(), Value::from(23.0f64));
/// assert!(predicate.admits(&row));
///
/// row.insert("price".to_string(), Value::from(45.2f64));
/// assert!(!predicate.admits(&row));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    field: String,
    field_type: FieldType,
    condition: Condition,
    operand: String,
    excluded: HashSet<Value<'static>>,
    active: bool,
}

impl FilterSpec {
    /// Creates an unrestricted, inactive spec for a column.
    pub fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        FilterSpec {
            field: field.into(),
            field_type,
            condition: Condition::None,
            operand: String::new(),
            excluded: HashSet::new(),
            active: false,
        }
    }

    pub fn for_descriptor(descriptor: &FieldDescriptor) -> Self {
        FilterSpec::new(descriptor.name.clone(), descriptor.field_type)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    /// Sets the condition. Choosing `Condition::None` clears the operand.
    pub fn set_condition(&mut self, condition: Condition) {
        self.condition = condition;
        if condition.is_none() {
            self.operand.clear();
        }
    }

    pub fn operand(&self) -> &str {
        &self.operand
    }

    pub fn set_operand(&mut self, operand: impl Into<String>) {
        self.operand = operand.into();
    }

    /// Values currently unchecked for this column.
    pub fn excluded(&self) -> &HashSet<Value<'static>> {
        &self.excluded
    }

    /// Marks a value as unchecked. Returns `false` if it already was.
    pub fn exclude(&mut self, value: Value<'_>) -> bool {
        self.excluded.insert(value.into_owned())
    }

    /// Marks a value as checked again. Returns `false` if it was not excluded.
    pub fn include(&mut self, value: &Value<'_>) -> bool {
        self.excluded.remove(&value.clone().into_owned())
    }

    /// Replaces the whole excluded set.
    pub fn set_excluded(&mut self, excluded: HashSet<Value<'static>>) {
        self.excluded = excluded;
    }

    /// Returns `true` once the spec has been stored in a registry.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns `true` if the conditional part restricts anything.
    pub fn has_condition(&self) -> bool {
        !self.condition.is_none() && !self.operand.is_empty()
    }

    /// Returns `true` if this spec can reject any row at all.
    pub fn has_restriction(&self) -> bool {
        !self.excluded.is_empty() || self.has_condition()
    }

    /// Checks that the operand parses for the column's type.
    ///
    /// Evaluation never fails on a bad operand (it just matches nothing);
    /// hosts call this to report the problem to the user.
    ///
    /// # Errors
    ///
    /// [`FilterError::ParseFailure`] for a numeric or date operand that does
    /// not parse.
    pub fn validate(&self, options: &FilterOptions) -> Result<()> {
        if !self.has_condition() {
            return Ok(());
        }
        let compiled =
            CompiledCondition::compile(self.condition, &self.operand, self.field_type, options);
        if compiled.is_invalid() {
            return Err(FilterError::ParseFailure {
                operand: self.operand.clone(),
                expected: self.field_type,
            });
        }
        Ok(())
    }

    /// Builds the row predicate for the current state.
    ///
    /// The predicate is a snapshot: later changes to this spec do not affect it.
    pub fn to_predicate(&self, options: &Arc<FilterOptions>) -> ColumnPredicate {
        let condition = self.has_condition().then(|| {
            CompiledCondition::compile(self.condition, &self.operand, self.field_type, options)
        });
        ColumnPredicate {
            field: self.field.clone(),
            field_type: self.field_type,
            excluded: Arc::new(self.excluded.clone()),
            condition,
            options: Arc::clone(options),
        }
    }
}

/// Row-admission test of one column.
///
/// Cheap to clone and safe to share between threads.
#[derive(Debug, Clone)]
pub struct ColumnPredicate {
    field: String,
    field_type: FieldType,
    excluded: Arc<HashSet<Value<'static>>>,
    condition: Option<CompiledCondition>,
    options: Arc<FilterOptions>,
}

impl ColumnPredicate {
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Decides whether `row` passes this column's filter.
    ///
    /// A row without the field passes. A value that cannot be read as the
    /// column's type fails the condition but never matches an exclusion.
    pub fn admits<R: Row + ?Sized>(&self, row: &R) -> bool {
        let value = match accessor::read(row, &self.field, self.field_type, &self.options) {
            Ok(value) => value,
            Err(FilterError::UnknownField { .. }) => return true,
            Err(_) => return self.condition.is_none(),
        };

        // Shortened to the row's lifetime so the lookup borrows the value
        let excluded: &HashSet<Value<'_>> = &self.excluded;
        if !excluded.is_empty() && excluded.contains(&value) {
            return false;
        }

        match &self.condition {
            Some(condition) => condition.matches(&value),
            None => true,
        }
    }
}
