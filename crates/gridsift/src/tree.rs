//! Year / month / day grouping of date check-lists.
//!
//! Date columns are not shown as a flat list. [`GroupNode::build`] buckets the
//! date entries of a check-list into a tree:
//!
//! ```text
//! (Select all)          level 0
//! ├── 2023              level 1
//! │   └── December      level 2
//! │       └── 31        level 3, leaf
//! ├── 2024
//! │   └── January
//! │       ├── 05
//! │       └── 06
//! └── (Blank)           level -1, leaf
//! ```
//!
//! Only leaves (days and the blank node) carry filtering state. They point
//! back into the check-list by index, and [`GroupNode::apply_to_items`]
//! writes their checked state there. Year and month nodes show "all leaves
//! checked" and are otherwise cosmetic.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::trace;

use crate::items::{FilterItem, ItemLevel};
use crate::options::Labels;

/// Depth of a node in the date tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupLevel {
    Root,
    Year,
    Month,
    Day,
    Blank,
}

impl GroupLevel {
    /// Numeric level: 0 for the root down to 3 for days, -1 for blank.
    pub fn as_i8(self) -> i8 {
        match self {
            GroupLevel::Root => 0,
            GroupLevel::Year => 1,
            GroupLevel::Month => 2,
            GroupLevel::Day => 3,
            GroupLevel::Blank => -1,
        }
    }
}

/// A node of the date tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    pub level: GroupLevel,
    /// Year, month (1-12) or day of month; `None` for root and blank.
    pub key: Option<i32>,
    pub label: String,
    pub checked: bool,
    pub children: Vec<GroupNode>,
    /// Index of the originating check-list entry, for days and blank.
    pub leaf: Option<usize>,
}

type Days = BTreeMap<u32, (usize, NaiveDate)>;

impl GroupNode {
    /// Builds the tree over every entry of a check-list.
    pub fn build(items: &[FilterItem], labels: &Labels) -> GroupNode {
        GroupNode::build_from(items, 0..items.len(), labels)
    }

    /// Builds the tree over the entries at `indices`.
    ///
    /// Used to rebuild a narrowed tree after a search. Entries that are not
    /// dates or the blank entry are ignored. Indices out of range are skipped.
    pub fn build_from<I>(items: &[FilterItem], indices: I, labels: &Labels) -> GroupNode
    where
        I: IntoIterator<Item = usize>,
    {
        let mut years: BTreeMap<i32, BTreeMap<u32, Days>> = BTreeMap::new();
        let mut blank = None;

        for index in indices {
            let Some(item) = items.get(index) else {
                continue;
            };
            match item.level {
                ItemLevel::Value => match item.value.as_ref().and_then(|v| v.as_date()) {
                    Some(date) => {
                        years
                            .entry(date.year())
                            .or_default()
                            .entry(date.month())
                            .or_default()
                            .entry(date.day())
                            .or_insert((index, date));
                    }
                    None => trace!(label = %item.label, "not a date, left out of tree"),
                },
                ItemLevel::Blank => {
                    blank.get_or_insert(index);
                }
                ItemLevel::All => {}
            }
        }

        let mut children: Vec<GroupNode> = years
            .into_iter()
            .map(|(year, months)| year_node(items, year, months))
            .collect();

        if let Some(index) = blank {
            children.push(GroupNode {
                level: GroupLevel::Blank,
                key: None,
                label: labels.blank.clone(),
                checked: items[index].checked,
                children: Vec::new(),
                leaf: Some(index),
            });
        }

        GroupNode {
            level: GroupLevel::Root,
            key: None,
            label: labels.all.clone(),
            checked: true,
            children,
            leaf: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }

    /// Child with the given key (year, month or day number).
    pub fn child(&self, key: i32) -> Option<&GroupNode> {
        self.children.iter().find(|child| child.key == Some(key))
    }

    pub fn child_mut(&mut self, key: i32) -> Option<&mut GroupNode> {
        self.children.iter_mut().find(|child| child.key == Some(key))
    }

    /// The blank node, if the tree has one.
    pub fn blank_mut(&mut self) -> Option<&mut GroupNode> {
        self.children
            .iter_mut()
            .find(|child| child.level == GroupLevel::Blank)
    }

    /// The node standing for check-list entry `index`.
    pub fn leaf_mut(&mut self, index: usize) -> Option<&mut GroupNode> {
        if self.leaf == Some(index) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.leaf_mut(index))
    }

    /// Checks or unchecks this node and everything below it.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
        for child in &mut self.children {
            child.set_checked(checked);
        }
    }

    /// Recomputes year and month nodes as "every leaf below is checked".
    ///
    /// Call after changing leaves directly. Leaves and the root keep their
    /// state.
    pub fn refresh(&mut self) {
        for child in &mut self.children {
            child.refresh();
        }
        if matches!(self.level, GroupLevel::Year | GroupLevel::Month) {
            self.checked = self.children.iter().all(|child| child.checked);
        }
    }

    /// Leaves below this node as `(check-list index, checked)`, in tree order.
    pub fn leaves(&self) -> Vec<(usize, bool)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<(usize, bool)>) {
        if let Some(index) = self.leaf {
            out.push((index, self.checked));
        }
        for child in &self.children {
            child.collect_leaves(out);
        }
    }

    /// Writes the leaves' checked state back into the check-list.
    pub fn apply_to_items(&self, items: &mut [FilterItem]) {
        for (index, checked) in self.leaves() {
            if let Some(item) = items.get_mut(index) {
                item.checked = checked;
            }
        }
    }
}

fn year_node(items: &[FilterItem], year: i32, months: BTreeMap<u32, Days>) -> GroupNode {
    let children: Vec<GroupNode> = months
        .into_iter()
        .map(|(month, days)| month_node(items, month, days))
        .collect();
    GroupNode {
        level: GroupLevel::Year,
        key: Some(year),
        label: year.to_string(),
        checked: children.iter().all(|child| child.checked),
        children,
        leaf: None,
    }
}

fn month_node(items: &[FilterItem], month: u32, days: Days) -> GroupNode {
    let mut label = String::new();
    let children: Vec<GroupNode> = days
        .into_iter()
        .map(|(day, (index, date))| {
            if label.is_empty() {
                label = date.format("%B").to_string();
            }
            GroupNode {
                level: GroupLevel::Day,
                key: Some(day as i32),
                label: date.format("%d").to_string(),
                checked: items[index].checked,
                children: Vec::new(),
                leaf: Some(index),
            }
        })
        .collect();
    GroupNode {
        level: GroupLevel::Month,
        key: Some(month as i32),
        label,
        checked: children.iter().all(|child| child.checked),
        children,
        leaf: None,
    }
}
