//! Headless driver of the filter workflow.
//!
//! A [`FilterSession`] owns a row collection, its schema and a
//! [`FilterRegistry`]. It plays the part a grid widget plays around the
//! engine: opening a column filter produces a [`ColumnFilter`] (the
//! check-list, plus a date tree for date columns), the host edits it, and
//! applying it stores the resulting spec.
//!
//! # Example
//!
//! ```
//! use gridsift::{FieldType, FilterOptions, FilterSession, Schema, Value};
//! use std::collections::BTreeMap;
//!
//! let rows: Vec<BTreeMap<String, Value<'static>>> = ["red", "green", "red"]
//!     .into_iter()
//!     .map(|c| BTreeMap::from([("color".to_string(), Value::from(c))]))
//!     .collect();
//! let schema = Schema::default().field("color", FieldType::String);
//!
//! let mut session = FilterSession::new(rows, schema, FilterOptions::default());
//! let mut column = session.open("color").unwrap();
//! // (Select all), green, red
//! column.items[2].checked = false;
//! session.apply(column).unwrap();
//!
//! assert_eq!(session.visible_count(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info};

use crate::condition::Condition;
use crate::distinct;
use crate::error::Result;
use crate::items::{self, FilterItem, ItemLevel};
use crate::options::FilterOptions;
use crate::registry::FilterRegistry;
use crate::row::{FieldType, Row, Schema};
use crate::search::{self, ItemSearch};
use crate::spec::FilterSpec;
use crate::tree::GroupNode;
use crate::value::Value;

/// Editable state of one column's filter dialog.
///
/// Entries can be edited through `items`, through the tree, or through
/// [`set_checked`](Self::set_checked), which keeps both in step. On apply,
/// tree leaves the host changed win over `items`, and entries hidden by the
/// active search are excluded.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    /// Spec the dialog edits. Condition and operand are set here directly.
    pub spec: FilterSpec,
    pub items: Vec<FilterItem>,
    /// Year/month/day tree, for date columns only.
    pub tree: Option<GroupNode>,
    /// Leaf states as of the last tree build, by check-list index.
    built_leaves: HashMap<usize, bool>,
    active_search: ItemSearch,
}

impl ColumnFilter {
    fn new(spec: FilterSpec, items: Vec<FilterItem>, tree: Option<GroupNode>) -> Self {
        let mut column = ColumnFilter {
            spec,
            items,
            tree,
            built_leaves: HashMap::new(),
            active_search: ItemSearch::default(),
        };
        column.record_leaves();
        column
    }

    /// Indices of the check-list entries visible under `search`.
    pub fn search(&self, search: &ItemSearch) -> Vec<usize> {
        search::search_items(&self.items, search)
    }

    /// The search applied with [`set_search`](Self::set_search).
    pub fn active_search(&self) -> &ItemSearch {
        &self.active_search
    }

    /// Makes `search` the dialog's search. Entries it hides count as
    /// unchecked when the filter is applied.
    pub fn set_search(&mut self, search: ItemSearch, options: &FilterOptions) {
        self.active_search = search;
        if self.tree.is_some() {
            self.tree = Some(search::narrowed_tree(
                &self.items,
                &self.active_search,
                &options.labels,
            ));
            self.record_leaves();
        }
    }

    /// Replaces the tree with one narrowed to `search`, which becomes the
    /// active search.
    ///
    /// Does nothing for columns without a tree.
    pub fn narrow_tree(&mut self, search: &ItemSearch, options: &FilterOptions) {
        if self.tree.is_some() {
            self.set_search(search.clone(), options);
        }
    }

    /// Checks or unchecks entry `index`, with its tree leaf.
    ///
    /// The "select all" entry toggles everything. Returns `false` if there
    /// is no such entry.
    pub fn set_checked(&mut self, index: usize, checked: bool) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        if item.level == ItemLevel::All {
            self.set_all(checked);
            return true;
        }
        item.checked = checked;
        items::sync_all(&mut self.items);
        if let Some(tree) = &mut self.tree {
            if let Some(leaf) = tree.leaf_mut(index) {
                leaf.checked = checked;
                tree.refresh();
            }
        }
        true
    }

    /// Checks or unchecks every entry, and the tree with it.
    pub fn set_all(&mut self, checked: bool) {
        items::set_all(&mut self.items, checked);
        if let Some(tree) = &mut self.tree {
            tree.set_checked(checked);
            tree.checked = true;
        }
    }

    /// Values the applied filter should exclude.
    pub fn excluded_values(&self) -> HashSet<Value<'static>> {
        let mut items = self.items.clone();
        if let Some(tree) = &self.tree {
            for (index, checked) in tree.leaves() {
                if self.built_leaves.get(&index) == Some(&checked) {
                    continue;
                }
                if let Some(item) = items.get_mut(index) {
                    item.checked = checked;
                }
            }
        }
        if !self.active_search.is_empty() {
            for item in items.iter_mut().filter(|item| item.level != ItemLevel::All) {
                if !self.active_search.matches(item) {
                    item.checked = false;
                }
            }
        }
        items::excluded_values(&items)
    }

    fn record_leaves(&mut self) {
        self.built_leaves = self
            .tree
            .as_ref()
            .map(|tree| tree.leaves().into_iter().collect())
            .unwrap_or_default();
    }
}

/// Rows plus the filters applied to them.
#[derive(Debug)]
pub struct FilterSession<R> {
    rows: Vec<R>,
    schema: Schema,
    registry: FilterRegistry,
}

impl<R: Row> FilterSession<R> {
    pub fn new(rows: Vec<R>, schema: Schema, options: FilterOptions) -> Self {
        FilterSession {
            rows,
            schema,
            registry: FilterRegistry::with_options(Arc::new(options)),
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    pub fn options(&self) -> &FilterOptions {
        self.registry.options()
    }

    /// Opens the filter of `field`.
    ///
    /// Distinct values come from the rows currently visible, plus whatever
    /// the column's filter excluded before. Entries start checked unless
    /// they are excluded.
    ///
    /// # Errors
    ///
    /// [`FilterError::UnknownField`](crate::FilterError::UnknownField) if the
    /// schema has no such field.
    pub fn open(&self, field: &str) -> Result<ColumnFilter> {
        let descriptor = self.schema.require(field)?;
        let spec = self
            .registry
            .get(field)
            .cloned()
            .unwrap_or_else(|| FilterSpec::for_descriptor(descriptor));
        let options = self.options();

        let snapshot = self.registry.snapshot();
        let distinct = distinct::collect(
            self.rows.iter().filter(|row| snapshot.admits(*row)),
            field,
            descriptor.field_type,
            self.registry.carried_exclusions(field),
            options,
        );
        let items = items::checklist(&distinct, spec.excluded(), options);
        let tree = (descriptor.field_type == FieldType::Date)
            .then(|| GroupNode::build(&items, &options.labels));

        debug!(field, entries = items.len(), "opened column filter");
        Ok(ColumnFilter::new(spec, items, tree))
    }

    /// Stores the outcome of an edited column filter.
    ///
    /// Unchecked entries become the spec's exclusions, see
    /// [`ColumnFilter::excluded_values`]. A filter that no longer restricts
    /// anything is removed.
    ///
    /// # Errors
    ///
    /// [`FilterError::ParseFailure`](crate::FilterError::ParseFailure) if
    /// the operand does not parse for the column type. Nothing is stored.
    pub fn apply(&mut self, column: ColumnFilter) -> Result<()> {
        column.spec.validate(self.options())?;
        let excluded = column.excluded_values();
        let mut spec = column.spec;
        spec.set_excluded(excluded);
        // Drops an operand typed after the condition was cleared
        if spec.condition() == Condition::None {
            spec.set_condition(Condition::None);
        }

        let field = spec.field().to_string();
        if spec.has_restriction() {
            self.registry.set_filter(spec);
        } else {
            self.registry.remove_filter(&field);
        }
        info!(field, visible = self.visible_count(), "applied filter");
        Ok(())
    }

    /// Removes the filter of `field`. Returns `false` if it had none.
    pub fn remove(&mut self, field: &str) -> bool {
        self.registry.remove_filter(field)
    }

    /// Swaps in a new row collection and drops every filter.
    pub fn replace_rows(&mut self, rows: Vec<R>) {
        debug!(rows = rows.len(), "replaced rows");
        self.rows = rows;
        self.registry.clear();
    }

    /// Rows passing every filter, in collection order.
    pub fn visible(&self) -> Vec<&R> {
        self.registry.snapshot().filter(&self.rows)
    }

    pub fn visible_count(&self) -> usize {
        let snapshot = self.registry.snapshot();
        self.rows.iter().filter(|row| snapshot.admits(*row)).count()
    }
}

impl<R: Row + Sync> FilterSession<R> {
    /// [`visible`](Self::visible) evaluated on the rayon pool.
    pub fn par_visible(&self) -> Vec<&R> {
        self.registry.snapshot().par_filter(&self.rows)
    }
}
