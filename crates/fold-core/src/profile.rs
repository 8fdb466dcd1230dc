//! Reusable merge configuration stored as JSON
//!
//! A profile captures everything about a recurring merge except the input
//! files: key columns, prefer-right columns, placeholder sentinels, and the
//! optional override rule. The CLI loads one in place of repeated flags.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::merge::MergeOptions;
use crate::prepare::DEFAULT_PLACEHOLDERS;
use crate::resolve::OverrideRule;

/// A saved merge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeProfile {
    /// Key columns defining row identity, in order
    pub key_columns: Vec<String>,
    /// Shared columns where the secondary value wins
    #[serde(default)]
    pub prefer_right: Vec<String>,
    /// Key values that disqualify a secondary row from matching
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,
    /// Optional flag column + sentinel forcing the secondary value per row
    #[serde(default)]
    pub override_rule: Option<OverrideRule>,
}

fn default_placeholders() -> Vec<String> {
    DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect()
}

impl MergeProfile {
    /// Create a profile with default placeholders
    pub fn new(key_columns: Vec<String>) -> Self {
        Self {
            key_columns,
            prefer_right: Vec::new(),
            placeholders: default_placeholders(),
            override_rule: None,
        }
    }

    /// Load a profile from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the profile to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The merge options this profile configures
    pub fn options(&self) -> MergeOptions {
        MergeOptions {
            prefer_right: self.prefer_right.clone(),
            override_rule: self.override_rule.clone(),
            placeholders: self.placeholders.clone(),
        }
    }
}
