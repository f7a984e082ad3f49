//! Distinct values of one column.
//!
//! [`collect`] scans rows for a field and returns its distinct non-blank
//! values in natural order, plus whether any blank (null or empty) value was
//! seen. Values the user excluded earlier are merged back in, so a re-opened
//! check-list still shows them unchecked.

use std::collections::HashSet;
use std::time::Instant;

use rayon::slice::ParallelSliceMut;
use serde::Serialize;
use tracing::{debug, trace};

use crate::accessor;
use crate::error::FilterError;
use crate::options::FilterOptions;
use crate::row::{FieldType, Row};
use crate::value::Value;

/// Result of scanning one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistinctValues {
    /// Distinct non-blank values, ascending.
    pub values: Vec<Value<'static>>,
    /// Whether a null or empty value was present.
    pub has_blank: bool,
}

impl DistinctValues {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && !self.has_blank
    }
}

/// Scans `rows` for the distinct values of `field`.
///
/// Rows without the field, and rows whose value does not fit `field_type`,
/// contribute nothing. `carried` holds exclusions from an earlier filter on
/// the same column; they are always part of the result.
pub fn collect<'r, R, I>(
    rows: I,
    field: &str,
    field_type: FieldType,
    carried: Option<&HashSet<Value<'static>>>,
    options: &FilterOptions,
) -> DistinctValues
where
    R: Row + ?Sized + 'r,
    I: IntoIterator<Item = &'r R>,
{
    let started = Instant::now();
    let mut seen: HashSet<Value<'r>> = HashSet::new();
    let mut has_blank = false;
    let mut scanned = 0usize;
    let mut skipped = 0usize;

    for row in rows {
        scanned += 1;
        match accessor::read(row, field, field_type, options) {
            Ok(value) if value.is_blank() => has_blank = true,
            Ok(value) => {
                seen.insert(value);
            }
            Err(FilterError::UnknownField { .. }) => skipped += 1,
            Err(err) => {
                trace!(%err, "skipping value");
                skipped += 1;
            }
        }
    }

    let mut values: Vec<Value<'static>> = seen.into_iter().map(Value::into_owned).collect();

    if let Some(carried) = carried {
        let missing: Vec<Value<'static>> = {
            let known: HashSet<&Value<'static>> = values.iter().collect();
            carried
                .iter()
                .filter(|value| {
                    if value.is_blank() {
                        has_blank = true;
                        false
                    } else {
                        !known.contains(value)
                    }
                })
                .cloned()
                .collect()
        };
        values.extend(missing);
    }

    if values.len() >= options.parallel_sort_threshold {
        values.par_sort_unstable();
    } else {
        values.sort_unstable();
    }

    debug!(
        field,
        scanned,
        skipped,
        distinct = values.len(),
        has_blank,
        elapsed_us = started.elapsed().as_micros() as u64,
        "collected distinct values"
    );

    DistinctValues { values, has_blank }
}
