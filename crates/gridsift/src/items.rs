//! Check-list entries shown for a column filter.
//!
//! A check-list is a "select all" entry, one entry per distinct value and an
//! optional blank entry at the end. Unchecked entries are what the user
//! wants hidden; [`excluded_values`] turns them back into a
//! [`FilterSpec`](crate::FilterSpec) exclusion set.

use std::collections::HashSet;

use serde::Serialize;

use crate::distinct::DistinctValues;
use crate::options::FilterOptions;
use crate::value::Value;

/// Kind of a check-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLevel {
    /// The synthetic "select all" entry.
    All,
    /// A distinct value.
    Value,
    /// The synthetic entry standing for null and empty values.
    Blank,
}

impl ItemLevel {
    /// Numeric level as used by hosts: 0, 1 and -1.
    pub fn as_i8(self) -> i8 {
        match self {
            ItemLevel::All => 0,
            ItemLevel::Value => 1,
            ItemLevel::Blank => -1,
        }
    }
}

/// One entry of a column check-list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterItem {
    pub level: ItemLevel,
    /// The distinct value; `None` for the synthetic entries.
    pub value: Option<Value<'static>>,
    pub label: String,
    pub checked: bool,
}

impl FilterItem {
    pub fn is_value(&self) -> bool {
        self.level == ItemLevel::Value
    }
}

/// Builds the check-list for a scanned column.
///
/// Values in `excluded` start unchecked. The blank entry starts unchecked
/// when either null or the empty string is excluded.
pub fn checklist(
    distinct: &DistinctValues,
    excluded: &HashSet<Value<'static>>,
    options: &FilterOptions,
) -> Vec<FilterItem> {
    let mut items = Vec::with_capacity(distinct.values.len() + 2);
    items.push(FilterItem {
        level: ItemLevel::All,
        value: None,
        label: options.labels.all.clone(),
        checked: true,
    });
    items.extend(distinct.values.iter().map(|value| FilterItem {
        level: ItemLevel::Value,
        label: options.format_value(value),
        checked: !excluded.contains(value),
        value: Some(value.clone()),
    }));
    if distinct.has_blank {
        let blank_excluded = excluded.iter().any(Value::is_blank);
        items.push(FilterItem {
            level: ItemLevel::Blank,
            value: None,
            label: options.labels.blank.clone(),
            checked: !blank_excluded,
        });
    }
    items
}

/// Collects the values of unchecked entries.
///
/// An unchecked blank entry excludes both null and the empty string.
pub fn excluded_values(items: &[FilterItem]) -> HashSet<Value<'static>> {
    let mut excluded = HashSet::new();
    for item in items.iter().filter(|item| !item.checked) {
        match (item.level, &item.value) {
            (ItemLevel::Value, Some(value)) => {
                excluded.insert(value.clone());
            }
            (ItemLevel::Blank, _) => {
                excluded.insert(Value::Null);
                excluded.insert(Value::from(""));
            }
            _ => {}
        }
    }
    excluded
}

/// Checks or unchecks every entry.
pub fn set_all(items: &mut [FilterItem], checked: bool) {
    for item in items {
        item.checked = checked;
    }
}

/// Sets the "select all" entry to whether every other entry is checked.
pub fn sync_all(items: &mut [FilterItem]) {
    let all_checked = items
        .iter()
        .filter(|item| item.level != ItemLevel::All)
        .all(|item| item.checked);
    for item in items.iter_mut().filter(|item| item.level == ItemLevel::All) {
        item.checked = all_checked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn distinct(values: &[&'static str], has_blank: bool) -> DistinctValues {
        DistinctValues {
            values: values.iter().map(|v| Value::from(*v)).collect(),
            has_blank,
        }
    }

    #[test]
    fn checklist_layout() {
        let excluded = HashSet::from([Value::from("b")]);
        let items = checklist(&distinct(&["a", "b"], true), &excluded, &FilterOptions::default());

        let levels: Vec<i8> = items.iter().map(|i| i.level.as_i8()).collect();
        assert_eq!(levels, vec![0, 1, 1, -1]);

        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["(Select all)", "a", "b", "(Blank)"]);

        let checked: Vec<bool> = items.iter().map(|i| i.checked).collect();
        assert_eq!(checked, vec![true, true, false, true]);
    }

    #[test]
    fn blank_entry_unchecked_when_empty_string_excluded() {
        let excluded = HashSet::from([Value::from("")]);
        let items = checklist(&distinct(&["a"], true), &excluded, &FilterOptions::default());
        assert_eq!(items.last().map(|i| i.checked), Some(false));
    }

    #[test]
    fn date_labels_use_display_format() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let values = DistinctValues {
            values: vec![Value::Date(day)],
            has_blank: false,
        };
        let options = FilterOptions {
            date_display_format: "%d.%m.%Y".into(),
            ..FilterOptions::default()
        };
        let items = checklist(&values, &HashSet::new(), &options);
        assert_eq!(items[1].label, "09.03.2024");
    }

    #[test]
    fn write_back_of_unchecked_entries() {
        let mut items = checklist(&distinct(&["a", "b"], true), &HashSet::new(), &FilterOptions::default());
        items[1].checked = false;
        items[3].checked = false;

        let excluded = excluded_values(&items);
        assert_eq!(
            excluded,
            HashSet::from([Value::from("a"), Value::Null, Value::from("")])
        );
    }

    #[test]
    fn select_all_toggles() {
        let mut items = checklist(&distinct(&["a", "b"], false), &HashSet::new(), &FilterOptions::default());
        set_all(&mut items, false);
        assert!(items.iter().all(|i| !i.checked));
        assert_eq!(excluded_values(&items).len(), 2);

        items[1].checked = true;
        items[2].checked = true;
        sync_all(&mut items);
        assert!(items[0].checked);

        items[2].checked = false;
        sync_all(&mut items);
        assert!(!items[0].checked);
    }
}
