//! Row and column lookup by label
//!
//! Used by callers that need to address a cell in a published table, e.g.
//! to update a single status field in place. A row label identifies a row
//! by its first-column value; the match must be unique.

use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};

/// Index of the column with this exact name
pub fn column_index(dataset: &Dataset, label: &str) -> Result<usize> {
    dataset
        .column_index(label)
        .ok_or_else(|| Error::ColumnNotFound {
            column: label.to_string(),
        })
}

/// Index of the single row whose first column matches the label.
///
/// Comparison is case-insensitive on the rendered value. Zero or multiple
/// matches fail: picking an arbitrary row silently would corrupt the
/// caller's update.
pub fn row_index(dataset: &Dataset, label: &str) -> Result<usize> {
    let needle = label.to_lowercase();

    let matches: Vec<usize> = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            row.get(0)
                .unwrap_or(&Value::Null)
                .to_field_string()
                .to_lowercase()
                == needle
        })
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        _ => Err(Error::AmbiguousRowLabel {
            label: label.to_string(),
            matches: matches.len(),
        }),
    }
}
