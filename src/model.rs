//! Canonical attachment models shared by both extraction paths.
//!
//! The modern bulk export writes a `manifest.json` that decodes straight into
//! these types; the legacy path flattens its activity trees into the same
//! shapes (see `legacy`), so reconciliation never cares where entries came
//! from.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};

/// One exported file reference.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// The name the tool actually wrote to disk.
    #[serde(rename = "exportedFileName")]
    pub exported_file_name: String,
    /// The convention-bearing name used for classification.
    #[serde(rename = "suggestedHumanReadableName")]
    pub suggested_human_readable_name: String,
}

/// One test's worth of attachments.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Entry {
    pub attachments: Vec<Attachment>,
    #[serde(rename = "testIdentifier", default)]
    pub test_identifier: Option<String>,
}

/// Pairing metadata emitted by the system under test next to each baseline.
/// Both fields are supplied by the test run, never computed here.
#[derive(Clone, Debug, Deserialize)]
pub struct AutomationDescriptor {
    #[serde(rename = "baselineFileName")]
    pub baseline_file_name: String,
    #[serde(
        rename = "baselineComparisonFolderURL",
        deserialize_with = "folder_url"
    )]
    pub baseline_comparison_folder_url: PathBuf,
}

// The descriptor encodes the folder as a file URL on some producers and as a
// plain path on others; both resolve to the same directory.
fn folder_url<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let path = raw.strip_prefix("file://").unwrap_or(&raw);
    Ok(PathBuf::from(path))
}

/// Decode the bulk-export manifest as a list of entries.
pub fn manifest_entries(manifest: &Path) -> Result<Vec<Entry>> {
    let data = fs::read_to_string(manifest)
        .with_context(|| format!("read manifest {}", manifest.display()))?;
    let entries = serde_json::from_str(&data)
        .with_context(|| format!("decode manifest {}", manifest.display()))?;
    Ok(entries)
}
