//! The set of active column filters and their composition.
//!
//! [`FilterRegistry`] owns one [`FilterSpec`] per field and composes them
//! into a single row-admission test: a row is visible when every column
//! admits it.
//!
//! Evaluation goes through a [`RegistrySnapshot`], an immutable list of
//! compiled predicates rebuilt on every mutation. Batches of rows are
//! evaluated against one snapshot, so a concurrent `set_filter` or `clear`
//! never shows a half-updated registry to an in-flight batch.
//!
//! # Example
//!
//! ```
//! use gridsift::{Condition, FieldType, FilterRegistry, FilterSpec, Value};
//! use std::collections::BTreeMap;
//!
//! let rows: Vec<BTreeMap<String, Value<'static>>> = ["alpha", "beta", "gamma"]
//!     .into_iter()
//!     .map(|name| BTreeMap::from([("name".to_string(), Value::from(name))]))
//!     .collect();
//!
//! let mut registry = FilterRegistry::new();
//! let mut spec = FilterSpec::new("name", FieldType::String);
//! spec.set_condition(Condition::Contains);
//! spec.set_operand("a");
//! spec.exclude(Value::from("gamma"));
//! registry.set_filter(spec);
//!
//! let visible = registry.snapshot().filter(&rows);
//! assert_eq!(visible.len(), 2);
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::options::FilterOptions;
use crate::row::Row;
use crate::spec::{ColumnPredicate, FilterSpec};
use crate::value::Value;

/// Ordered collection of column filters, at most one per field.
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    specs: Vec<FilterSpec>,
    options: Arc<FilterOptions>,
    snapshot: Arc<RegistrySnapshot>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        FilterRegistry::new()
    }
}

impl FilterRegistry {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        FilterRegistry::with_options(Arc::new(FilterOptions::default()))
    }

    /// Creates an empty registry that compiles predicates with `options`.
    pub fn with_options(options: Arc<FilterOptions>) -> Self {
        FilterRegistry {
            specs: Vec::new(),
            options,
            snapshot: Arc::new(RegistrySnapshot::default()),
        }
    }

    pub fn options(&self) -> &Arc<FilterOptions> {
        &self.options
    }

    /// Stores `spec`, replacing any spec for the same field.
    ///
    /// A replaced spec keeps its position; a new one is appended. The stored
    /// spec is marked active. Returns the spec it replaced.
    pub fn set_filter(&mut self, mut spec: FilterSpec) -> Option<FilterSpec> {
        spec.set_active(true);
        debug!(
            field = spec.field(),
            condition = %spec.condition(),
            excluded = spec.excluded().len(),
            "set filter"
        );
        let previous = match self.position(spec.field()) {
            Some(index) => Some(std::mem::replace(&mut self.specs[index], spec)),
            None => {
                self.specs.push(spec);
                None
            }
        };
        self.rebuild();
        previous
    }

    /// Removes the spec for `field`. Returns `false` if there was none.
    pub fn remove_filter(&mut self, field: &str) -> bool {
        match self.position(field) {
            Some(index) => {
                self.specs.remove(index);
                debug!(field, "removed filter");
                self.rebuild();
                true
            }
            None => false,
        }
    }

    /// Drops every filter. Snapshots taken earlier remain valid.
    pub fn clear(&mut self) {
        if self.specs.is_empty() {
            return;
        }
        debug!(count = self.specs.len(), "cleared filters");
        self.specs.clear();
        self.rebuild();
    }

    pub fn get(&self, field: &str) -> Option<&FilterSpec> {
        self.specs.iter().find(|spec| spec.field() == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specs in the order their fields were first filtered.
    pub fn iter(&self) -> impl Iterator<Item = &FilterSpec> {
        self.specs.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(FilterSpec::field)
    }

    /// Excluded values to carry into the next scan of `field`.
    ///
    /// Re-opening a filtered column must still list the values the user
    /// unchecked, even when no current row holds them.
    pub fn carried_exclusions(&self, field: &str) -> Option<&HashSet<Value<'static>>> {
        self.get(field).map(FilterSpec::excluded)
    }

    /// Returns the current snapshot of compiled predicates.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Snapshot of every filter except the one on `field`.
    pub fn snapshot_without(&self, field: &str) -> RegistrySnapshot {
        RegistrySnapshot {
            predicates: self
                .snapshot
                .predicates
                .iter()
                .filter(|predicate| predicate.field() != field)
                .cloned()
                .collect(),
        }
    }

    /// Tests one row against every filter.
    pub fn admits<R: Row + ?Sized>(&self, row: &R) -> bool {
        self.snapshot.admits(row)
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.field() == field)
    }

    fn rebuild(&mut self) {
        let predicates = self
            .specs
            .iter()
            .filter(|spec| spec.is_active() && spec.has_restriction())
            .map(|spec| spec.to_predicate(&self.options))
            .collect();
        self.snapshot = Arc::new(RegistrySnapshot { predicates });
    }
}

/// Immutable, thread-safe view of a registry at one point in time.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    predicates: Vec<ColumnPredicate>,
}

impl RegistrySnapshot {
    /// Number of restricting predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// A row passes when every predicate admits it.
    pub fn admits<R: Row + ?Sized>(&self, row: &R) -> bool {
        self.predicates.iter().all(|predicate| predicate.admits(row))
    }

    /// Rows that pass, in their original order.
    pub fn filter<'r, R: Row>(&self, rows: &'r [R]) -> Vec<&'r R> {
        rows.iter().filter(|row| self.admits(*row)).collect()
    }

    /// Same as [`filter`](Self::filter), spread over the rayon pool.
    pub fn par_filter<'r, R: Row + Sync>(&self, rows: &'r [R]) -> Vec<&'r R> {
        rows.par_iter().filter(|row| self.admits(*row)).collect()
    }

    /// Number of rows that pass.
    pub fn count<R: Row + Sync>(&self, rows: &[R]) -> usize {
        if self.is_empty() {
            return rows.len();
        }
        rows.par_iter().filter(|row| self.admits(*row)).count()
    }
}
