//! Per-column conflict resolution policies
//!
//! For every column present on both sides of a join (and not part of the
//! key), exactly one value per row survives:
//!
//! - prefer-left (default): the left value wins unless it is null-equivalent
//!   and the right value is not strictly null.
//! - prefer-right: the right value wins unless it is null-equivalent and the
//!   left value is not strictly null. Of two null-equivalent values this
//!   keeps the right-hand blank over a left-hand null.
//! - an override rule names a flag column and a sentinel; rows whose flag
//!   cell equals the sentinel take the right value unconditionally.
//!
//! A column whose resolution cannot be set up (the override flag column is
//! missing from the joined output) is reported and left as its two
//! side-suffixed variants; other columns are unaffected.

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Value};
use crate::join::JoinedRow;

/// Suffix for the primary-side variant of an unresolved shared column
pub const LEFT_SUFFIX: &str = "_left";
/// Suffix for the secondary-side variant of an unresolved shared column
pub const RIGHT_SUFFIX: &str = "_right";

/// Flag column + sentinel value forcing the right side to win on a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Column holding the flag
    pub column: String,
    /// Sentinel value that triggers the override
    pub value: String,
}

/// Which side's non-null value wins a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    PreferLeft,
    PreferRight,
}

/// Where the override flag cell is read from in a joined row.
///
/// The flag may live on either side: a key column reads from whichever side
/// is present, a single-side column reads from its side, and a shared
/// column reads its right-hand variant.
#[derive(Debug, Clone)]
pub(crate) struct FlagSource {
    left_index: Option<usize>,
    right_index: Option<usize>,
    sentinel: String,
}

impl FlagSource {
    fn read<'a>(&self, row: &'a JoinedRow) -> Option<&'a Value> {
        if let (Some(idx), Some(left)) = (self.left_index, row.left.as_ref()) {
            return left.get(idx);
        }
        if let (Some(idx), Some(right)) = (self.right_index, row.right.as_ref()) {
            return right.get(idx);
        }
        None
    }

    fn triggered(&self, row: &JoinedRow) -> bool {
        match self.read(row) {
            Some(value) => value.to_field_string() == self.sentinel,
            None => false,
        }
    }
}

/// Resolution recipe for one shared column
#[derive(Debug, Clone)]
pub(crate) struct ColumnPlan {
    pub name: String,
    pub left_index: usize,
    pub right_index: usize,
    pub policy: Policy,
    pub flag: Option<FlagSource>,
}

impl ColumnPlan {
    /// Pick the surviving value for one joined row
    pub fn resolve(&self, row: &JoinedRow) -> Value {
        let left = row
            .left
            .as_ref()
            .and_then(|r| r.get(self.left_index))
            .cloned()
            .unwrap_or(Value::Null);
        let right = row
            .right
            .as_ref()
            .and_then(|r| r.get(self.right_index))
            .cloned()
            .unwrap_or(Value::Null);

        match self.policy {
            Policy::PreferLeft => {
                if !left.is_absent() || right.is_null() {
                    left
                } else {
                    right
                }
            }
            Policy::PreferRight => {
                let mut take_right = !right.is_absent() || left.is_null();
                if let Some(flag) = &self.flag {
                    take_right |= flag.triggered(row);
                }
                if take_right {
                    right
                } else {
                    left
                }
            }
        }
    }
}

/// Outcome of planning one shared column
#[derive(Debug, Clone)]
pub(crate) enum SharedColumn {
    Resolved(ColumnPlan),
    /// Resolution failed to set up; the column keeps both side variants
    Unresolved { name: String, reason: String },
}

/// Plan resolution for every shared column, in lexicographic order.
///
/// `shared` must already be sorted and exclude key columns. Planning never
/// aborts: a column that cannot be resolved is reported and the rest
/// continue.
pub(crate) fn plan_shared_columns(
    left: &Dataset,
    right: &Dataset,
    key_columns: &[String],
    shared: &[String],
    prefer_right: &[String],
    override_rule: Option<&OverrideRule>,
) -> Vec<SharedColumn> {
    shared
        .iter()
        .map(|name| {
            let left_index = left.column_index(name).expect("shared column in left");
            let right_index = right.column_index(name).expect("shared column in right");

            let policy = if prefer_right.iter().any(|c| c == name) {
                Policy::PreferRight
            } else {
                Policy::PreferLeft
            };

            let flag = match (policy, override_rule) {
                (Policy::PreferRight, Some(rule)) => {
                    match locate_flag(left, right, key_columns, shared, rule) {
                        Some(source) => Some(source),
                        None => {
                            return SharedColumn::Unresolved {
                                name: name.clone(),
                                reason: format!(
                                    "override flag column '{}' not present in joined output",
                                    rule.column
                                ),
                            };
                        }
                    }
                }
                _ => None,
            };

            SharedColumn::Resolved(ColumnPlan {
                name: name.clone(),
                left_index,
                right_index,
                policy,
                flag,
            })
        })
        .collect()
}

/// Locate the override flag column in the joined output.
///
/// Lookup order mirrors the output layout: an unsuffixed column first (a key
/// or a single-side column), then the right-hand variant of a shared column.
fn locate_flag(
    left: &Dataset,
    right: &Dataset,
    key_columns: &[String],
    shared: &[String],
    rule: &OverrideRule,
) -> Option<FlagSource> {
    let name = rule.column.as_str();
    let sentinel = rule.value.clone();

    if key_columns.iter().any(|k| k == name) {
        return Some(FlagSource {
            left_index: left.column_index(name),
            right_index: right.column_index(name),
            sentinel,
        });
    }

    let is_shared = shared.iter().any(|c| c == name);
    if !is_shared {
        if let Some(idx) = left.column_index(name) {
            return Some(FlagSource {
                left_index: Some(idx),
                right_index: None,
                sentinel,
            });
        }
        if let Some(idx) = right.column_index(name) {
            return Some(FlagSource {
                left_index: None,
                right_index: Some(idx),
                sentinel,
            });
        }
        return None;
    }

    // Shared flag column: the refreshed (right) side carries the flag
    right.column_index(name).map(|idx| FlagSource {
        left_index: None,
        right_index: Some(idx),
        sentinel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Row;
    use crate::join::MergeIndicator;

    fn joined(left: Vec<Value>, right: Vec<Value>) -> JoinedRow {
        JoinedRow {
            indicator: MergeIndicator::Both,
            left: Some(Row::new(left)),
            right: Some(Row::new(right)),
        }
    }

    fn plan(policy: Policy) -> ColumnPlan {
        ColumnPlan {
            name: "name".to_string(),
            left_index: 0,
            right_index: 0,
            policy,
            flag: None,
        }
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_prefer_left_takes_left_when_present() {
        let row = joined(vec![text("Alice")], vec![text("Alicia")]);
        assert_eq!(plan(Policy::PreferLeft).resolve(&row), text("Alice"));
    }

    #[test]
    fn test_prefer_left_falls_back_on_blank() {
        let row = joined(vec![text("")], vec![text("Alicia")]);
        assert_eq!(plan(Policy::PreferLeft).resolve(&row), text("Alicia"));
    }

    #[test]
    fn test_prefer_left_both_absent() {
        let row = joined(vec![Value::Null], vec![text(" ")]);
        assert!(plan(Policy::PreferLeft).resolve(&row).is_absent());
    }

    #[test]
    fn test_prefer_right_takes_right_when_present() {
        let row = joined(vec![text("Alice")], vec![text("Alicia")]);
        assert_eq!(plan(Policy::PreferRight).resolve(&row), text("Alicia"));
    }

    #[test]
    fn test_prefer_right_falls_back_when_right_absent() {
        let row = joined(vec![text("Alice")], vec![Value::Null]);
        assert_eq!(plan(Policy::PreferRight).resolve(&row), text("Alice"));
    }

    #[test]
    fn test_prefer_right_blank_beats_null() {
        // left is strictly null, right is blank: the right blank survives
        let row = joined(vec![Value::Null], vec![text("")]);
        assert_eq!(plan(Policy::PreferRight).resolve(&row), text(""));
    }

    #[test]
    fn test_override_forces_right() {
        let mut p = plan(Policy::PreferRight);
        p.left_index = 0;
        p.right_index = 0;
        p.flag = Some(FlagSource {
            left_index: None,
            right_index: Some(1),
            sentinel: "refresh".to_string(),
        });

        // right value is blank, left is real; the flag still forces right
        let row = joined(vec![text("Alice")], vec![text(""), text("refresh")]);
        assert_eq!(p.resolve(&row), text(""));

        // without the sentinel the left value survives
        let row = joined(vec![text("Alice")], vec![text(""), text("keep")]);
        assert_eq!(p.resolve(&row), text("Alice"));
    }

    #[test]
    fn test_missing_side_reads_null() {
        let row = JoinedRow {
            indicator: MergeIndicator::LeftOnly,
            left: Some(Row::new(vec![text("Alice")])),
            right: None,
        };
        assert_eq!(plan(Policy::PreferLeft).resolve(&row), text("Alice"));
        // prefer-right falls back to left when the right side is missing
        assert_eq!(plan(Policy::PreferRight).resolve(&row), text("Alice"));
    }
}
