//! Merge engine: join two datasets and collapse column conflicts
//!
//! The pipeline is: validate key columns, condition the secondary dataset
//! (dedupe, then placeholder filter), join on normalized keys, and resolve
//! every shared column down to a single value per row. The output column
//! order is deterministic: repeated merges of the same inputs produce the
//! same serialized layout.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dataset::{Column, Dataset, Row, Value};
use crate::error::{Error, Result};
use crate::join::{join, JoinKind, JoinedRow, MergeIndicator};
use crate::key::validate_key_columns;
use crate::prepare::{dedupe_by_key, filter_placeholders, DEFAULT_PLACEHOLDERS};
use crate::resolve::{
    plan_shared_columns, ColumnPlan, OverrideRule, SharedColumn, LEFT_SUFFIX, RIGHT_SUFFIX,
};

/// Name of the provenance column the CLI can append to merged output
pub const INDICATOR_COLUMN: &str = "_merge";

/// Per-merge configuration: conflict preferences and placeholder sentinels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Shared columns where the secondary (right) value wins
    #[serde(default)]
    pub prefer_right: Vec<String>,
    /// Optional flag column + sentinel forcing the right value per row
    #[serde(default)]
    pub override_rule: Option<OverrideRule>,
    /// Key values that disqualify a secondary row from matching
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
}

fn default_placeholders() -> Vec<String> {
    DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect()
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            prefer_right: Vec::new(),
            override_rule: None,
            placeholders: default_placeholders(),
        }
    }
}

/// Result of a merge call
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// The merged dataset
    pub dataset: Dataset,
    /// Provenance tag per output row, parallel to `dataset.rows`
    pub indicators: Vec<MergeIndicator>,
    /// Columns whose conflict resolution failed, as (column, reason).
    /// These keep their two side-suffixed variants in the output.
    pub unresolved: Vec<(String, String)>,
}

impl MergeOutput {
    /// Dataset with the provenance tag appended as a trailing text column
    pub fn with_indicator_column(&self) -> Dataset {
        let mut columns = self.dataset.columns.clone();
        columns.push(Column::new(INDICATOR_COLUMN.to_string(), columns.len()));

        let rows: Vec<Row> = self
            .dataset
            .rows
            .iter()
            .zip(&self.indicators)
            .map(|(row, indicator)| {
                let mut values = row.values.clone();
                values.push(Value::Text(indicator.to_string()));
                Row::new(values)
            })
            .collect();

        Dataset { columns, rows }
    }

    /// Keep only rows carrying the given provenance tag
    pub fn select(&self, indicator: MergeIndicator) -> Dataset {
        let rows: Vec<Row> = self
            .dataset
            .rows
            .iter()
            .zip(&self.indicators)
            .filter(|(_, i)| **i == indicator)
            .map(|(row, _)| row.clone())
            .collect();

        Dataset {
            columns: self.dataset.columns.clone(),
            rows,
        }
    }
}

/// Where an output column's values come from
enum ColumnSource {
    /// Key column: read from whichever side is present
    Key { left: usize, right: usize },
    /// Primary-side column (or the left variant of an unresolved pair)
    Left(usize),
    /// Secondary-side column (or the right variant of an unresolved pair)
    Right(usize),
    /// Shared column collapsed by its resolution plan
    Resolved(ColumnPlan),
}

/// Merge two datasets on the given key columns.
///
/// The secondary dataset is deduplicated (first row per key wins) and
/// stripped of placeholder identities before joining. Shared non-key
/// columns are resolved per `options`; resolution failures are reported in
/// the output rather than aborting the merge. An empty primary dataset
/// short-circuits: the primary comes back unchanged.
pub fn merge(
    primary: &Dataset,
    secondary: &Dataset,
    key_columns: &[String],
    how: JoinKind,
    options: &MergeOptions,
) -> Result<MergeOutput> {
    if key_columns.is_empty() {
        return Err(Error::EmptyKeyColumns);
    }
    validate_key_columns(primary, secondary, key_columns)?;

    let deduped = dedupe_by_key(secondary, key_columns)?;
    let conditioned = filter_placeholders(&deduped, &key_columns[0], &options.placeholders)?;

    if primary.is_empty() {
        return Ok(MergeOutput {
            dataset: primary.clone(),
            indicators: Vec::new(),
            unresolved: Vec::new(),
        });
    }

    let joined = join(primary, &conditioned, key_columns, how)?;

    // Shared columns in sorted order, keys excluded; sorting keeps the
    // output column order stable across runs.
    let key_set: HashSet<&str> = key_columns.iter().map(|s| s.as_str()).collect();
    let right_names: HashSet<&str> = conditioned.column_names().into_iter().collect();
    let mut shared: Vec<String> = primary
        .column_names()
        .into_iter()
        .filter(|name| right_names.contains(name) && !key_set.contains(name))
        .map(|name| name.to_string())
        .collect();
    shared.sort();

    let plans = plan_shared_columns(
        primary,
        &conditioned,
        key_columns,
        &shared,
        &options.prefer_right,
        options.override_rule.as_ref(),
    );

    let resolved: HashSet<&str> = plans
        .iter()
        .filter_map(|p| match p {
            SharedColumn::Resolved(plan) => Some(plan.name.as_str()),
            SharedColumn::Unresolved { .. } => None,
        })
        .collect();
    let unresolved: Vec<(String, String)> = plans
        .iter()
        .filter_map(|p| match p {
            SharedColumn::Resolved(_) => None,
            SharedColumn::Unresolved { name, reason } => Some((name.clone(), reason.clone())),
        })
        .collect();

    // Output layout: primary columns in schema order (resolved shared
    // columns deferred, unresolved ones as their left variant), then
    // secondary-only columns (unresolved shared as the right variant),
    // then resolved shared columns appended in sorted order.
    let mut names: Vec<String> = Vec::new();
    let mut sources: Vec<ColumnSource> = Vec::new();

    for col in &primary.columns {
        let name = col.name.as_str();
        if key_set.contains(name) {
            names.push(name.to_string());
            sources.push(ColumnSource::Key {
                left: col.index,
                right: conditioned.column_index(name).expect("validated key"),
            });
        } else if resolved.contains(name) {
            continue;
        } else if right_names.contains(name) {
            names.push(format!("{name}{LEFT_SUFFIX}"));
            sources.push(ColumnSource::Left(col.index));
        } else {
            names.push(name.to_string());
            sources.push(ColumnSource::Left(col.index));
        }
    }

    let left_names: HashSet<&str> = primary.column_names().into_iter().collect();
    for col in &conditioned.columns {
        let name = col.name.as_str();
        if key_set.contains(name) || resolved.contains(name) {
            continue;
        }
        if left_names.contains(name) {
            names.push(format!("{name}{RIGHT_SUFFIX}"));
        } else {
            names.push(name.to_string());
        }
        sources.push(ColumnSource::Right(col.index));
    }

    for plan in plans {
        if let SharedColumn::Resolved(plan) = plan {
            names.push(plan.name.clone());
            sources.push(ColumnSource::Resolved(plan));
        }
    }

    let columns: Vec<Column> = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| Column::new(name, i))
        .collect();

    let mut rows: Vec<Row> = Vec::with_capacity(joined.len());
    let mut indicators: Vec<MergeIndicator> = Vec::with_capacity(joined.len());

    for jrow in &joined {
        let values: Vec<Value> = sources
            .iter()
            .map(|source| read_source(source, jrow))
            .collect();
        rows.push(Row::new(values));
        indicators.push(jrow.indicator);
    }

    Ok(MergeOutput {
        dataset: Dataset { columns, rows },
        indicators,
        unresolved,
    })
}

fn read_source(source: &ColumnSource, jrow: &JoinedRow) -> Value {
    match source {
        ColumnSource::Key { left, right } => match &jrow.left {
            Some(row) => row.get(*left).cloned().unwrap_or(Value::Null),
            None => jrow
                .right
                .as_ref()
                .and_then(|r| r.get(*right))
                .cloned()
                .unwrap_or(Value::Null),
        },
        ColumnSource::Left(idx) => jrow
            .left
            .as_ref()
            .and_then(|r| r.get(*idx))
            .cloned()
            .unwrap_or(Value::Null),
        ColumnSource::Right(idx) => jrow
            .right
            .as_ref()
            .and_then(|r| r.get(*idx))
            .cloned()
            .unwrap_or(Value::Null),
        ColumnSource::Resolved(plan) => plan.resolve(jrow),
    }
}
