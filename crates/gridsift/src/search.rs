//! Narrowing a check-list by typed text.
//!
//! Searching only hides entries of the check-list; it never changes their
//! checked state. The "select all" entry stays visible whatever the text,
//! and the blank entry disappears as soon as any text is typed.

use serde::{Deserialize, Serialize};

use crate::items::{FilterItem, ItemLevel};
use crate::options::Labels;
use crate::tree::GroupNode;

/// How the search text is matched against entry labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Contains,
    StartsWith,
}

/// Case-insensitive search over entry labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemSearch {
    needle: String,
    mode: SearchMode,
}

impl ItemSearch {
    pub fn new(text: &str, mode: SearchMode) -> Self {
        ItemSearch {
            needle: text.to_lowercase(),
            mode,
        }
    }

    /// Returns `true` if there is no text to search for.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    /// Decides whether one entry stays visible.
    pub fn matches(&self, item: &FilterItem) -> bool {
        if self.is_empty() || item.level == ItemLevel::All {
            return true;
        }
        if item.level == ItemLevel::Blank {
            return false;
        }
        let label = item.label.to_lowercase();
        match self.mode {
            SearchMode::Contains => label.contains(&self.needle),
            SearchMode::StartsWith => label.starts_with(&self.needle),
        }
    }
}

/// Indices of the entries visible under `search`, in list order.
pub fn search_items(items: &[FilterItem], search: &ItemSearch) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| search.matches(item))
        .map(|(index, _)| index)
        .collect()
}

/// Date tree to show while `search` is active.
///
/// With no search text this is the full tree. Otherwise the tree holds only
/// the visible entries that are checked, and is just the root when none is.
pub fn narrowed_tree(items: &[FilterItem], search: &ItemSearch, labels: &Labels) -> GroupNode {
    if search.is_empty() {
        return GroupNode::build(items, labels);
    }
    let visible = search_items(items, search)
        .into_iter()
        .filter(|&index| items[index].checked);
    GroupNode::build_from(items, visible, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use chrono::NaiveDate;

    fn item(level: ItemLevel, label: &str, checked: bool) -> FilterItem {
        FilterItem {
            level,
            value: (level == ItemLevel::Value).then(|| Value::from(label.to_string())),
            label: label.to_string(),
            checked,
        }
    }

    fn items() -> Vec<FilterItem> {
        vec![
            item(ItemLevel::All, "(Select all)", true),
            item(ItemLevel::Value, "Item A", true),
            item(ItemLevel::Value, "Other item", true),
            item(ItemLevel::Value, "Thing", true),
            item(ItemLevel::Blank, "(Blank)", true),
        ]
    }

    #[test]
    fn empty_search_shows_everything() {
        let items = items();
        let visible = search_items(&items, &ItemSearch::default());
        assert_eq!(visible, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn contains_is_case_insensitive() {
        let items = items();
        let visible = search_items(&items, &ItemSearch::new("ITEM", SearchMode::Contains));
        assert_eq!(visible, vec![0, 1, 2]);
    }

    #[test]
    fn starts_with() {
        let items = items();
        let visible = search_items(&items, &ItemSearch::new("item", SearchMode::StartsWith));
        assert_eq!(visible, vec![0, 1]);
    }

    #[test]
    fn blank_never_matches_text() {
        let items = items();
        let visible = search_items(&items, &ItemSearch::new("blank", SearchMode::Contains));
        assert_eq!(visible, vec![0]);
    }

    #[test]
    fn narrowed_tree_keeps_visible_checked_dates() {
        let date_item = |d: u32, checked: bool| {
            let date = NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
            FilterItem {
                level: ItemLevel::Value,
                value: Some(Value::Date(date)),
                label: date.format("%Y-%m-%d").to_string(),
                checked,
            }
        };
        let items = vec![
            item(ItemLevel::All, "(Select all)", true),
            date_item(5, true),
            date_item(6, false),
            date_item(15, true),
        ];
        let labels = Labels::default();

        let full = narrowed_tree(&items, &ItemSearch::default(), &labels);
        assert_eq!(full.leaves().len(), 3);

        let narrowed = narrowed_tree(&items, &ItemSearch::new("01-0", SearchMode::Contains), &labels);
        assert_eq!(narrowed.leaves(), vec![(1, true)]);

        let none = narrowed_tree(&items, &ItemSearch::new("1999", SearchMode::Contains), &labels);
        assert!(none.children.is_empty());
    }
}
