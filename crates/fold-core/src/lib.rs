//! fold-core: Core library for merging and reconciling tabular record sets
//!
//! This library provides functionality to:
//! - Represent tabular data as immutable datasets of typed scalar values
//! - Merge two datasets on key columns with per-column conflict policies
//! - Preserve operator-edited columns across a refresh of a published table
//! - Select rows already confirmed in a previously published snapshot
//! - Read and write datasets as CSV, and discover dated snapshot files

pub mod dataset;
pub mod error;
pub mod io;
pub mod join;
pub mod key;
pub mod locate;
pub mod merge;
pub mod prepare;
pub mod profile;
pub mod reconcile;
pub mod resolve;
pub mod snapshot;

pub use dataset::{Column, Dataset, Row, Value};
pub use error::{Error, Result};
pub use io::{read_csv, read_csv_str, write_csv, write_csv_string};
pub use join::{JoinKind, MergeIndicator};
pub use merge::{merge, MergeOptions, MergeOutput, INDICATOR_COLUMN};
pub use prepare::{dedupe_by_key, filter_placeholders, DEFAULT_PLACEHOLDERS};
pub use profile::MergeProfile;
pub use reconcile::{preserve, select_confirmed, DEFAULT_STATUS_VALUE};
pub use resolve::OverrideRule;
pub use snapshot::{latest_snapshot, scan_snapshots, SnapshotScan, SnapshotSeries};
