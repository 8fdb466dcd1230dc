//! Discovery of published snapshot files on disk
//!
//! Published tables are kept as CSV files, one series per table, with
//! optional date-stamped versions: `roster.csv`, `roster_2026-07-01.csv`,
//! `roster_2026-08-01.csv`. The store walks a directory tree, groups files
//! into series by base name, and answers "newest snapshot for this name".
//! Loading the file is the CSV collaborator's job.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// A dated (or undated) snapshot file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotVersion {
    /// Full path to the file
    pub path: PathBuf,
    /// Date parsed from the file stem, None for an undated base file
    pub published_on: Option<NaiveDate>,
}

/// All discovered versions of one published table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSeries {
    /// Base name of the series (e.g., "roster")
    pub name: String,
    /// Versions sorted oldest to newest, undated base file first
    pub versions: Vec<SnapshotVersion>,
}

impl SnapshotSeries {
    /// The newest version of this series
    pub fn latest(&self) -> Option<&SnapshotVersion> {
        self.versions.last()
    }
}

/// Result of scanning directories for snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotScan {
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// Discovered series, sorted by name
    pub series: Vec<SnapshotSeries>,
    /// Total number of files found
    pub total_files: usize,
}

impl SnapshotScan {
    /// Find a series by name
    pub fn find_series(&self, name: &str) -> Option<&SnapshotSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// All series names
    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Scan one or more directories for snapshot CSVs and group them into series
pub fn scan_snapshots<P: AsRef<Path>>(roots: &[P]) -> Result<SnapshotScan> {
    let mut file_map: BTreeMap<String, Vec<SnapshotVersion>> = BTreeMap::new();
    let mut total_files = 0;

    for root in roots {
        let root = root.as_ref();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    let (name, published_on) = split_stem(stem);

                    file_map.entry(name).or_default().push(SnapshotVersion {
                        path: path.to_path_buf(),
                        published_on,
                    });

                    total_files += 1;
                }
            }
        }
    }

    let series: Vec<SnapshotSeries> = file_map
        .into_iter()
        .map(|(name, mut versions)| {
            // Undated base file first, then dated versions ascending, so
            // the last element is always the newest
            versions.sort_by(|a, b| match (&a.published_on, &b.published_on) {
                (None, None) => a.path.cmp(&b.path),
                (None, Some(_)) => std::cmp::Ordering::Less,
                (Some(_), None) => std::cmp::Ordering::Greater,
                (Some(da), Some(db)) => da.cmp(db).then_with(|| a.path.cmp(&b.path)),
            });

            SnapshotSeries { name, versions }
        })
        .collect();

    Ok(SnapshotScan {
        roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
        series,
        total_files,
    })
}

/// Path of the newest snapshot for a name
pub fn latest_snapshot<P: AsRef<Path>>(roots: &[P], name: &str) -> Result<PathBuf> {
    let scan = scan_snapshots(roots)?;
    scan.find_series(name)
        .and_then(|s| s.latest())
        .map(|v| v.path.clone())
        .ok_or_else(|| Error::SnapshotNotFound(name.to_string()))
}

/// Split a file stem into series name and optional trailing date
///
/// Examples:
/// - "roster" -> ("roster", None)
/// - "roster_2026-08-01" -> ("roster", Some(2026-08-01))
/// - "mailing_list_2026-08-01" -> ("mailing_list", Some(2026-08-01))
/// - "roster_final" -> ("roster_final", None)
fn split_stem(stem: &str) -> (String, Option<NaiveDate>) {
    if let Some(last_underscore) = stem.rfind('_') {
        let suffix = &stem[last_underscore + 1..];
        if let Ok(date) = NaiveDate::parse_from_str(suffix, "%Y-%m-%d") {
            return (stem[..last_underscore].to_string(), Some(date));
        }
    }

    (stem.to_string(), None)
}
