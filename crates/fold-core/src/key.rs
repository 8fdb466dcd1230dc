//! Key normalization for type-stable join comparisons
//!
//! Key values arriving from different collaborators often disagree on type
//! for the same identity: a spreadsheet read yields the string "5" where a
//! scrape yields the integer 5 (or the float 5.0). Comparisons run on a
//! canonical string form instead of the native values:
//!
//! - null normalizes to the empty string
//! - text is trimmed
//! - integers render in decimal
//! - integral floats drop the fractional part (5.0 -> "5")
//! - dates render as ISO `%Y-%m-%d`
//!
//! Normalization is comparison-only; output cells keep their native types.

use crate::dataset::{Dataset, Value};
use crate::error::{Error, Result};

/// Separator between the parts of a composite key. Unit-separator control
/// character, which cannot appear in parsed cell text.
const KEY_SEPARATOR: char = '\u{1f}';

/// Canonical comparable form of a single key value
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Text(s) => s.trim().to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
    }
}

/// Check that every key column exists in both datasets.
///
/// Fails with `SchemaMismatch` before any row is processed.
pub fn validate_key_columns(
    primary: &Dataset,
    secondary: &Dataset,
    key_columns: &[String],
) -> Result<()> {
    for key in key_columns {
        if !primary.has_column(key) {
            return Err(Error::SchemaMismatch {
                column: key.clone(),
                dataset: "primary".to_string(),
            });
        }
        if !secondary.has_column(key) {
            return Err(Error::SchemaMismatch {
                column: key.clone(),
                dataset: "secondary".to_string(),
            });
        }
    }
    Ok(())
}

/// Resolve key column names to indices in this dataset's schema
pub fn key_indices(dataset: &Dataset, key_columns: &[String]) -> Result<Vec<usize>> {
    key_columns
        .iter()
        .map(|k| {
            dataset
                .column_index(k)
                .ok_or_else(|| Error::ColumnNotFound { column: k.clone() })
        })
        .collect()
}

/// Normalized composite key for one row
pub fn row_key(dataset: &Dataset, row: usize, key_indices: &[usize]) -> String {
    let mut parts = Vec::with_capacity(key_indices.len());
    for &idx in key_indices {
        let value = dataset.value(row, idx).unwrap_or(&Value::Null);
        parts.push(normalize_value(value));
    }
    parts.join(&KEY_SEPARATOR.to_string())
}
