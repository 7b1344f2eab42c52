//! Baseline/descriptor pairing and the copy engine.
//!
//! Every attachment name is classified once; keys present in both mappings
//! form a pair, the descriptor names the destination, and the copy is always
//! latest-wins. Keys missing either half, or whose descriptor cannot be read
//! or decoded, are skipped without failing the run since partial bundles are
//! expected.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::classify::{parse_attachment_name, Kind};
use crate::model::{AutomationDescriptor, Entry};

/// Key → exported-filename mappings for the two halves of each pairing.
///
/// `BTreeMap` keeps reconciliation order lexicographic by key, so repeated
/// runs over the same bundle behave identically.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Mappings {
    pub baseline_files: BTreeMap<String, String>,
    pub descriptor_files: BTreeMap<String, String>,
}

/// Classify every attachment's human-readable name into the two mappings.
/// A key seen twice keeps the last attachment in entry order.
pub fn build_mappings(entries: &[Entry]) -> Mappings {
    let mut mappings = Mappings::default();
    for entry in entries {
        for attachment in &entry.attachments {
            let Some((key, kind)) =
                parse_attachment_name(&attachment.suggested_human_readable_name)
            else {
                continue;
            };
            let files = match kind {
                Kind::Baseline => &mut mappings.baseline_files,
                Kind::Manifest => &mut mappings.descriptor_files,
            };
            files.insert(key, attachment.exported_file_name.clone());
        }
    }
    mappings
}

/// Copy every paired baseline to the directory its descriptor names (or the
/// override), overwriting existing files. Returns the copied count.
pub fn copy_baselines(
    mappings: &Mappings,
    attachments_dir: &Path,
    baseline_dir_override: Option<&Path>,
) -> Result<usize> {
    let mut copied = 0;

    for (key, baseline_file) in &mappings.baseline_files {
        let Some(descriptor_file) = mappings.descriptor_files.get(key) else {
            continue;
        };

        let descriptor_path = attachments_dir.join(descriptor_file);
        let Ok(descriptor_data) = fs::read_to_string(&descriptor_path) else {
            continue;
        };
        let Ok(descriptor) = serde_json::from_str::<AutomationDescriptor>(&descriptor_data)
        else {
            continue;
        };

        let source = attachments_dir.join(baseline_file);
        let target_dir =
            baseline_dir_override.unwrap_or(&descriptor.baseline_comparison_folder_url);
        let destination = target_dir.join(&descriptor.baseline_file_name);

        fs::create_dir_all(target_dir)
            .with_context(|| format!("create {}", target_dir.display()))?;
        if destination.exists() {
            fs::remove_file(&destination)
                .with_context(|| format!("remove {}", destination.display()))?;
        }
        fs::copy(&source, &destination).with_context(|| {
            format!("copy {} -> {}", source.display(), destination.display())
        })?;

        info!("Copied: {baseline_file} -> {}", destination.display());
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
