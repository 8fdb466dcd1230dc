//! Operator workflows layered on the merge engine
//!
//! `preserve` carries operator-edited columns from a previously published
//! snapshot into a freshly computed dataset; `select_confirmed` filters a
//! dataset down to rows an operator already confirmed in a snapshot.

use crate::dataset::{Dataset, Row};
use crate::error::{Error, Result};
use crate::join::{JoinKind, MergeIndicator};
use crate::merge::{merge, MergeOptions};

/// Status value `select_confirmed` looks for by default
pub const DEFAULT_STATUS_VALUE: &str = "confirmed";

/// Attach preserved column values from a snapshot to a fresh dataset.
///
/// Preserved columns missing from the snapshot are treated as all-blank.
/// If any key column is missing from the snapshot (the schema just
/// changed), preservation is skipped and the fresh dataset comes back
/// unchanged rather than merging on a partial key. Only snapshot rows with
/// at least one non-blank preserved value participate; fresh values win
/// wherever they are present (prefer-left), so preserved values only fill
/// holes. Running preserve twice with the same snapshot yields the same
/// result as once.
pub fn preserve(
    snapshot: &Dataset,
    fresh: &Dataset,
    key_columns: &[String],
    preserved_columns: &[String],
) -> Result<Dataset> {
    let mut result = if snapshot.is_empty() {
        fresh.clone()
    } else {
        let mut snap = snapshot.clone();
        for column in preserved_columns {
            if !snap.has_column(column) {
                snap = snap.with_blank_column(column);
            }
        }

        // If the snapshot predates a key rename it cannot be joined; keep
        // the fresh dataset as-is instead of merging on a partial key.
        let keys_available = key_columns.iter().all(|k| snap.has_column(k));

        if keys_available {
            let preserved_indices: Vec<usize> = preserved_columns
                .iter()
                .map(|c| snap.column_index(c).expect("preserved column added above"))
                .collect();

            let rows: Vec<Row> = snap
                .rows
                .iter()
                .filter(|row| {
                    preserved_indices
                        .iter()
                        .any(|&i| row.get(i).map(|v| !v.is_absent()).unwrap_or(false))
                })
                .cloned()
                .collect();
            let snap = Dataset {
                columns: snap.columns.clone(),
                rows,
            };

            let mut projection: Vec<String> = key_columns.to_vec();
            projection.extend(preserved_columns.iter().cloned());
            let carried = snap.project(&projection)?;

            merge(
                fresh,
                &carried,
                key_columns,
                JoinKind::Left,
                &MergeOptions::default(),
            )?
            .dataset
        } else {
            fresh.clone()
        }
    };

    for column in preserved_columns {
        if !result.has_column(column) {
            result = result.with_blank_column(column);
        }
    }

    Ok(result)
}

/// Keep only rows whose key was confirmed in a snapshot.
///
/// The snapshot is filtered to rows whose status cell renders equal to
/// `status_value`, then the dataset is left-joined onto those keys; rows
/// present on both sides survive. With no confirmed snapshot rows the
/// result is empty (the dataset's schema is kept).
pub fn select_confirmed(
    snapshot: &Dataset,
    dataset: &Dataset,
    key_columns: &[String],
    status_column: &str,
    status_value: &str,
) -> Result<Dataset> {
    let status_index =
        snapshot
            .column_index(status_column)
            .ok_or_else(|| Error::SchemaMismatch {
                column: status_column.to_string(),
                dataset: "snapshot".to_string(),
            })?;

    let rows: Vec<Row> = snapshot
        .rows
        .iter()
        .filter(|row| {
            row.get(status_index)
                .map(|v| v.to_field_string() == status_value)
                .unwrap_or(false)
        })
        .cloned()
        .collect();

    if rows.is_empty() {
        return Ok(dataset.empty_like());
    }

    let confirmed = Dataset {
        columns: snapshot.columns.clone(),
        rows,
    };
    let confirmed_keys = confirmed.project(key_columns)?;

    let out = merge(
        dataset,
        &confirmed_keys,
        key_columns,
        JoinKind::Left,
        &MergeOptions::default(),
    )?;

    Ok(out.select(MergeIndicator::Both))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use crate::io::read_csv_str;

    fn keys() -> Vec<String> {
        vec!["email".to_string()]
    }

    fn preserved() -> Vec<String> {
        vec!["action".to_string(), "action notes".to_string()]
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_preserve_carries_operator_edits() {
        let snapshot = read_csv_str(
            "email,name,action,action notes\na@x.com,Al,confirmed,called twice\nb@x.com,Bea,,\n",
            "snapshot.csv",
        )
        .unwrap();
        let fresh = read_csv_str(
            "email,name\na@x.com,Alfred\nb@x.com,Beatrice\n",
            "fresh.csv",
        )
        .unwrap();

        let out = preserve(&snapshot, &fresh, &keys(), &preserved()).unwrap();

        let action = out.column_index("action").unwrap();
        let notes = out.column_index("action notes").unwrap();
        let name = out.column_index("name").unwrap();

        // fresh values win, operator edits fill the holes
        assert_eq!(out.rows[0].values[name], text("Alfred"));
        assert_eq!(out.rows[0].values[action], text("confirmed"));
        assert_eq!(out.rows[0].values[notes], text("called twice"));
        // the all-blank snapshot row contributed nothing
        assert!(out.rows[1].values[action].is_absent());
    }

    #[test]
    fn test_preserve_missing_key_returns_fresh_unchanged() {
        let snapshot = read_csv_str(
            "id,action\n1,confirmed\n",
            "snapshot.csv",
        )
        .unwrap();
        let fresh = read_csv_str("email,name\na@x.com,Al\n", "fresh.csv").unwrap();

        let out = preserve(&snapshot, &fresh, &keys(), &preserved()).unwrap();

        // preservation skipped, preserved columns still backfilled blank
        assert_eq!(out.row_count(), 1);
        let action = out.column_index("action").unwrap();
        assert_eq!(out.rows[0].values[action], text(""));
    }

    #[test]
    fn test_preserve_empty_snapshot() {
        let snapshot = read_csv_str("email,action\n", "snapshot.csv").unwrap();
        let fresh = read_csv_str("email,name\na@x.com,Al\n", "fresh.csv").unwrap();

        let out = preserve(&snapshot, &fresh, &keys(), &preserved()).unwrap();

        assert_eq!(out.row_count(), 1);
        assert!(out.has_column("action"));
        assert!(out.has_column("action notes"));
    }

    #[test]
    fn test_preserve_adds_missing_preserved_column_to_snapshot() {
        // snapshot carries "action" but not "action notes"
        let snapshot = read_csv_str(
            "email,action\na@x.com,confirmed\n",
            "snapshot.csv",
        )
        .unwrap();
        let fresh = read_csv_str("email,name\na@x.com,Al\n", "fresh.csv").unwrap();

        let out = preserve(&snapshot, &fresh, &keys(), &preserved()).unwrap();

        let action = out.column_index("action").unwrap();
        assert_eq!(out.rows[0].values[action], text("confirmed"));
        assert!(out.has_column("action notes"));
    }

    #[test]
    fn test_preserve_is_idempotent() {
        let snapshot = read_csv_str(
            "email,name,action,action notes\na@x.com,Al,confirmed,ok\n",
            "snapshot.csv",
        )
        .unwrap();
        let fresh = read_csv_str(
            "email,name\na@x.com,Alfred\nb@x.com,Bea\n",
            "fresh.csv",
        )
        .unwrap();

        let once = preserve(&snapshot, &fresh, &keys(), &preserved()).unwrap();
        let twice = preserve(&snapshot, &once, &keys(), &preserved()).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_select_confirmed_keeps_confirmed_keys() {
        let snapshot = read_csv_str(
            "id,status\n1,confirmed\n2,pending\n",
            "snapshot.csv",
        )
        .unwrap();
        let dataset = read_csv_str(
            "id,name\n1,Al\n2,Bea\n3,Cy\n",
            "dataset.csv",
        )
        .unwrap();

        let out = select_confirmed(
            &snapshot,
            &dataset,
            &["id".to_string()],
            "status",
            DEFAULT_STATUS_VALUE,
        )
        .unwrap();

        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0].values[0], Value::Integer(1));
        assert_eq!(out.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_select_confirmed_none_confirmed() {
        let snapshot = read_csv_str("id,status\n1,pending\n", "snapshot.csv").unwrap();
        let dataset = read_csv_str("id,name\n1,Al\n", "dataset.csv").unwrap();

        let out = select_confirmed(
            &snapshot,
            &dataset,
            &["id".to_string()],
            "status",
            DEFAULT_STATUS_VALUE,
        )
        .unwrap();

        assert!(out.is_empty());
        assert_eq!(out.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_select_confirmed_normalizes_key_types() {
        // snapshot keys read back as text, dataset keys are integers
        let mut snapshot = Dataset::new(&["id", "status"]);
        snapshot.push_row(vec![text("1"), text("confirmed")]);
        let dataset = read_csv_str("id,name\n1,Al\n2,Bea\n", "dataset.csv").unwrap();

        let out = select_confirmed(
            &snapshot,
            &dataset,
            &["id".to_string()],
            "status",
            DEFAULT_STATUS_VALUE,
        )
        .unwrap();

        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0].values[0], Value::Integer(1));
    }

    #[test]
    fn test_select_confirmed_missing_status_column() {
        let snapshot = read_csv_str("id,note\n1,x\n", "snapshot.csv").unwrap();
        let dataset = read_csv_str("id,name\n1,Al\n", "dataset.csv").unwrap();

        let err = select_confirmed(
            &snapshot,
            &dataset,
            &["id".to_string()],
            "status",
            DEFAULT_STATUS_VALUE,
        )
        .unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_select_confirmed_duplicate_confirmations_do_not_fan_out() {
        let snapshot = read_csv_str(
            "id,status\n1,confirmed\n1,confirmed\n",
            "snapshot.csv",
        )
        .unwrap();
        let dataset = read_csv_str("id,name\n1,Al\n", "dataset.csv").unwrap();

        let out = select_confirmed(
            &snapshot,
            &dataset,
            &["id".to_string()],
            "status",
            DEFAULT_STATUS_VALUE,
        )
        .unwrap();

        assert_eq!(out.row_count(), 1);
    }
}
