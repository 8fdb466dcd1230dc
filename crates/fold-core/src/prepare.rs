//! Conditioning of the secondary dataset before joining
//!
//! The secondary side may carry multiple observations per identity and
//! placeholder identities that must never match. Both are stripped before
//! the join: dedup first, then the placeholder filter on the primary key
//! column.

use std::collections::HashSet;

use crate::dataset::{Dataset, Row, Value};
use crate::error::Result;
use crate::key::{key_indices, row_key};

/// Placeholder key values that disqualify a row from matching
pub const DEFAULT_PLACEHOLDERS: &[&str] = &["pending", "unknown", "n/a", "unavailable"];

/// Keep one row per normalized key, first occurrence wins
pub fn dedupe_by_key(dataset: &Dataset, key_columns: &[String]) -> Result<Dataset> {
    let indices = key_indices(dataset, key_columns)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows: Vec<Row> = Vec::new();

    for (i, row) in dataset.rows.iter().enumerate() {
        let key = row_key(dataset, i, &indices);
        if seen.insert(key) {
            rows.push(row.clone());
        }
    }

    Ok(Dataset {
        columns: dataset.columns.clone(),
        rows,
    })
}

/// Drop rows whose primary key value is absent or a placeholder.
///
/// Only the first key column is checked; placeholder comparison is
/// case-sensitive against the rendered value.
pub fn filter_placeholders(
    dataset: &Dataset,
    primary_key_column: &str,
    placeholders: &[String],
) -> Result<Dataset> {
    let idx = key_indices(dataset, &[primary_key_column.to_string()])?[0];

    let rows: Vec<Row> = dataset
        .rows
        .iter()
        .filter(|row| {
            let value = row.get(idx).unwrap_or(&Value::Null);
            if value.is_absent() {
                return false;
            }
            let rendered = value.to_field_string();
            !placeholders.iter().any(|p| p == &rendered)
        })
        .cloned()
        .collect();

    Ok(Dataset {
        columns: dataset.columns.clone(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_csv_str;

    fn keys() -> Vec<String> {
        vec!["email".to_string()]
    }

    #[test]
    fn test_dedupe_first_wins() {
        let csv = "email,name\nb@x.com,Bob\nb@x.com,Bobby\na@x.com,Al\n";
        let ds = read_csv_str(csv, "secondary.csv").unwrap();

        let out = dedupe_by_key(&ds, &keys()).unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.rows[0].values[1], Value::Text("Bob".to_string()));
        assert_eq!(out.rows[1].values[1], Value::Text("Al".to_string()));
    }

    #[test]
    fn test_dedupe_idempotent() {
        let csv = "email,name\nb@x.com,Bob\nb@x.com,Bobby\n";
        let ds = read_csv_str(csv, "secondary.csv").unwrap();

        let once = dedupe_by_key(&ds, &keys()).unwrap();
        let twice = dedupe_by_key(&once, &keys()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dedupe_normalized_key() {
        // integer 5 and string "5" are the same identity
        let mut ds = Dataset::new(&["id", "name"]);
        ds.push_row(vec![Value::Integer(5), Value::Text("first".into())]);
        ds.push_row(vec![Value::Text("5".into()), Value::Text("second".into())]);

        let out = dedupe_by_key(&ds, &["id".to_string()]).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0].values[1], Value::Text("first".to_string()));
    }

    #[test]
    fn test_filter_placeholders() {
        let csv = "email,name\nunknown,Who\na@x.com,Al\npending,Soon\n,Blank\n";
        let ds = read_csv_str(csv, "secondary.csv").unwrap();

        let placeholders: Vec<String> =
            DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect();
        let out = filter_placeholders(&ds, "email", &placeholders).unwrap();

        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0].values[0], Value::Text("a@x.com".to_string()));
    }

    #[test]
    fn test_filter_placeholders_case_sensitive() {
        let csv = "email,name\nUnknown,Kept\nunknown,Dropped\n";
        let ds = read_csv_str(csv, "secondary.csv").unwrap();

        let placeholders: Vec<String> =
            DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect();
        let out = filter_placeholders(&ds, "email", &placeholders).unwrap();

        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0].values[0], Value::Text("Unknown".to_string()));
    }
}
