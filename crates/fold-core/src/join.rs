//! Equality join on normalized key columns with provenance tagging

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dataset::{Dataset, Row};
use crate::error::Result;
use crate::key::{key_indices, row_key};

/// Which rows survive the join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    /// Keep matched rows plus unmatched rows from both sides
    #[default]
    Outer,
    /// Keep matched rows plus unmatched primary rows
    Left,
    /// Keep only matched rows
    Inner,
    /// Keep matched rows plus unmatched secondary rows
    Right,
}

impl std::str::FromStr for JoinKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "outer" => Ok(JoinKind::Outer),
            "left" => Ok(JoinKind::Left),
            "inner" => Ok(JoinKind::Inner),
            "right" => Ok(JoinKind::Right),
            other => Err(format!(
                "unknown join kind '{}', expected outer, left, inner or right",
                other
            )),
        }
    }
}

/// Provenance of an output row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeIndicator {
    /// Key present in the primary dataset only
    LeftOnly,
    /// Key present in the secondary dataset only
    RightOnly,
    /// Key present in both datasets
    Both,
}

impl std::fmt::Display for MergeIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LeftOnly => write!(f, "left_only"),
            Self::RightOnly => write!(f, "right_only"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// One output row of the join, carrying both source rows whole.
///
/// Nothing is collapsed here; conflict resolution needs every shared value
/// from both sides.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    pub indicator: MergeIndicator,
    pub left: Option<Row>,
    pub right: Option<Row>,
}

/// Join two datasets on normalized key equality.
///
/// Matched and left-only rows come out in primary row order, followed by
/// unmatched secondary rows in secondary row order. The secondary dataset
/// is expected to be deduplicated; with duplicate keys the first row wins.
pub fn join(
    primary: &Dataset,
    secondary: &Dataset,
    key_columns: &[String],
    how: JoinKind,
) -> Result<Vec<JoinedRow>> {
    let left_indices = key_indices(primary, key_columns)?;
    let right_indices = key_indices(secondary, key_columns)?;

    let mut right_by_key: HashMap<String, usize> = HashMap::new();
    for i in 0..secondary.row_count() {
        let key = row_key(secondary, i, &right_indices);
        right_by_key.entry(key).or_insert(i);
    }

    let mut right_matched = vec![false; secondary.row_count()];
    let mut out: Vec<JoinedRow> = Vec::new();

    for (i, row) in primary.rows.iter().enumerate() {
        let key = row_key(primary, i, &left_indices);
        match right_by_key.get(&key) {
            Some(&ri) => {
                right_matched[ri] = true;
                out.push(JoinedRow {
                    indicator: MergeIndicator::Both,
                    left: Some(row.clone()),
                    right: Some(secondary.rows[ri].clone()),
                });
            }
            None => {
                if how != JoinKind::Inner && how != JoinKind::Right {
                    out.push(JoinedRow {
                        indicator: MergeIndicator::LeftOnly,
                        left: Some(row.clone()),
                        right: None,
                    });
                }
            }
        }
    }

    if how == JoinKind::Outer || how == JoinKind::Right {
        for (ri, row) in secondary.rows.iter().enumerate() {
            if !right_matched[ri] {
                out.push(JoinedRow {
                    indicator: MergeIndicator::RightOnly,
                    left: None,
                    right: Some(row.clone()),
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_csv_str;

    fn keys() -> Vec<String> {
        vec!["email".to_string()]
    }

    fn inputs() -> (Dataset, Dataset) {
        let left = read_csv_str("email,name\na@x.com,Al\nb@x.com,Bea\n", "left.csv").unwrap();
        let right =
            read_csv_str("email,phone\nb@x.com,555\nc@x.com,556\n", "right.csv").unwrap();
        (left, right)
    }

    #[test]
    fn test_outer_join_completeness() {
        let (left, right) = inputs();
        let rows = join(&left, &right, &keys(), JoinKind::Outer).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].indicator, MergeIndicator::LeftOnly);
        assert_eq!(rows[1].indicator, MergeIndicator::Both);
        assert!(rows[1].left.is_some() && rows[1].right.is_some());
        assert_eq!(rows[2].indicator, MergeIndicator::RightOnly);
        assert!(rows[2].left.is_none());
    }

    #[test]
    fn test_left_join_drops_right_only() {
        let (left, right) = inputs();
        let rows = join(&left, &right, &keys(), JoinKind::Left).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.indicator != MergeIndicator::RightOnly));
    }

    #[test]
    fn test_inner_join_keeps_matches_only() {
        let (left, right) = inputs();
        let rows = join(&left, &right, &keys(), JoinKind::Inner).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].indicator, MergeIndicator::Both);
    }

    #[test]
    fn test_right_join_drops_left_only() {
        let (left, right) = inputs();
        let rows = join(&left, &right, &keys(), JoinKind::Right).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.indicator != MergeIndicator::LeftOnly));
    }

    #[test]
    fn test_join_kind_parse() {
        assert_eq!("outer".parse::<JoinKind>().unwrap(), JoinKind::Outer);
        assert_eq!("LEFT".parse::<JoinKind>().unwrap(), JoinKind::Left);
        assert!("cross".parse::<JoinKind>().is_err());
    }

    #[test]
    fn test_indicator_display() {
        assert_eq!(MergeIndicator::LeftOnly.to_string(), "left_only");
        assert_eq!(MergeIndicator::RightOnly.to_string(), "right_only");
        assert_eq!(MergeIndicator::Both.to_string(), "both");
    }
}
