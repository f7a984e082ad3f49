//! Engine configuration.
//!
//! [`FilterOptions`] deserializes from any serde format with every field
//! optional, so a host config file only needs the keys it overrides.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::search::SearchMode;
use crate::value::Value;

static DEFAULT_OPTIONS: Lazy<FilterOptions> = Lazy::new(FilterOptions::default);

/// Tunables for evaluation, scanning and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Absolute tolerance of numeric `Equals`/`NotEquals`.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// chrono patterns tried, in order, when parsing a date operand.
    /// Date-time patterns are truncated to the date.
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
    /// chrono pattern used to label dates in check-lists and searches.
    #[serde(default = "default_date_display_format")]
    pub date_display_format: String,
    /// Distinct value lists at least this long are sorted in parallel.
    #[serde(default = "default_parallel_sort_threshold")]
    pub parallel_sort_threshold: usize,
    #[serde(default)]
    pub search_mode: SearchMode,
    #[serde(default)]
    pub labels: Labels,
}

fn default_epsilon() -> f64 {
    1e-6
}

fn default_date_formats() -> Vec<String> {
    [
        "%Y-%m-%d",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d",
        "%m/%d/%Y",
        "%m/%d/%Y %H:%M:%S",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_date_display_format() -> String {
    "%Y-%m-%d".into()
}

fn default_parallel_sort_threshold() -> usize {
    10_000
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            date_formats: default_date_formats(),
            date_display_format: default_date_display_format(),
            parallel_sort_threshold: default_parallel_sort_threshold(),
            search_mode: SearchMode::default(),
            labels: Labels::default(),
        }
    }
}

impl FilterOptions {
    /// Process-wide default options, for callers that do not carry their own.
    pub fn shared_default() -> &'static FilterOptions {
        &DEFAULT_OPTIONS
    }

    /// Parses a date typed by the user, trying RFC 3339 first and then every
    /// configured pattern. Any time component is discarded.
    pub fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        parse_date_with(&self.date_formats, text)
    }

    /// Parses a number typed by the user.
    pub fn parse_number(&self, text: &str) -> Option<f64> {
        text.trim().parse::<f64>().ok()
    }

    /// Label of a value in a check-list.
    pub fn format_value(&self, value: &Value<'_>) -> String {
        match value.as_date() {
            Some(date) => date.format(&self.date_display_format).to_string(),
            None => value.to_string(),
        }
    }
}

/// Parses a date against an explicit list of chrono patterns.
pub(crate) fn parse_date_with(formats: &[String], text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local().date());
    }
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(text, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date()))
    })
}

/// Display strings of the synthetic check-list entries.
///
/// Localization is left to the host; these are only the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(default = "default_all_label")]
    pub all: String,
    #[serde(default = "default_blank_label")]
    pub blank: String,
}

fn default_all_label() -> String {
    "(Select all)".into()
}

fn default_blank_label() -> String {
    "(Blank)".into()
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            all: default_all_label(),
            blank: default_blank_label(),
        }
    }
}
