//! Extraction strategy selection and the two export pipelines.
//!
//! `xcresulttool export attachments` exists only from Xcode 15.3 on, so the
//! run probes the sub-command's help text and falls back to the legacy
//! graph/get/export pipeline when the bulk path is missing. Both branches
//! leave the attachments directory populated and return canonical entries
//! for reconciliation.

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{error, info};

use crate::classify::strip_index_uuid;
use crate::legacy;
use crate::model::{manifest_entries, Entry};
use crate::tool::{OutputTo, ToolRunner};

/// All invocations go through `xcrun` so the active developer directory's
/// xcresulttool is picked up.
pub const XCRUN: &str = "xcrun";

/// Help-text marker advertising the modern bulk export.
const BULK_EXPORT_MARKER: &str = "attachments";

fn summary_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\* ActionTestSummary\s+- Id:\s+(\S+)").expect("summary id pattern")
    })
}

/// Extract every ActionTestSummary id from a `graph` dump, in order of
/// appearance.
pub fn extract_test_summary_ids(text: &str) -> Vec<String> {
    summary_id_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|id| id.as_str().to_string()))
        .collect()
}

/// Probe `export --help` for the bulk-attachment export.
///
/// The probe is the first tool invocation of the run; if it fails the tool
/// is unusable and the whole run is meaningless, so the error propagates.
pub fn is_export_attachments_available(
    runner: &dyn ToolRunner,
    workspace: &Path,
) -> Result<bool> {
    let check_file = workspace.join("export-attachments-check");
    runner
        .run(
            XCRUN,
            &string_args(&["xcresulttool", "export", "--help"]),
            OutputTo::File(&check_file),
        )
        .context("probe xcresulttool export --help")?;
    let help = fs::read_to_string(&check_file)
        .with_context(|| format!("read {}", check_file.display()))?;
    fs::remove_file(&check_file)
        .with_context(|| format!("remove {}", check_file.display()))?;
    Ok(help.contains(BULK_EXPORT_MARKER))
}

/// Modern branch: one bulk export, then the manifest is the entry source.
///
/// Returns `None` when the export finished but left no manifest behind; the
/// condition is logged and the run ends with zero copies.
pub fn export_modern(
    runner: &dyn ToolRunner,
    bundle: &Path,
    workspace: &Path,
    attachments_dir: &Path,
) -> Result<Option<Vec<Entry>>> {
    let result_file = workspace.join("export-attachments-result");
    runner
        .run(
            XCRUN,
            &string_args(&[
                "xcresulttool",
                "export",
                "attachments",
                "--path",
                path_arg(bundle)?,
                "--output-path",
                path_arg(attachments_dir)?,
            ]),
            OutputTo::File(&result_file),
        )
        .context("export attachments")?;

    let manifest = attachments_dir.join("manifest.json");
    if !manifest.exists() {
        error!("No manifest.json found at '{}'.", manifest.display());
        return Ok(None);
    }
    Ok(Some(manifest_entries(&manifest)?))
}

/// Legacy branch: graph dump, per-summary fetch, per-attachment export.
pub fn export_legacy(
    runner: &dyn ToolRunner,
    bundle: &Path,
    workspace: &Path,
    attachments_dir: &Path,
    legacy_flag: bool,
) -> Result<Vec<Entry>> {
    info!("Getting graph...");

    // The graph for a large run does not fit comfortably in a pipe buffer.
    let graph_file = workspace.join("graph");
    let mut graph_args = string_args(&["xcresulttool", "graph", "--path", path_arg(bundle)?]);
    push_legacy_flag(&mut graph_args, legacy_flag);
    runner
        .run(XCRUN, &graph_args, OutputTo::File(&graph_file))
        .context("dump xcresult graph")?;

    let graph_output = fs::read_to_string(&graph_file)
        .with_context(|| format!("read {}", graph_file.display()))?;
    fs::remove_file(&graph_file)
        .with_context(|| format!("remove {}", graph_file.display()))?;

    let summary_ids = extract_test_summary_ids(&graph_output);
    let mut entries = Vec::with_capacity(summary_ids.len());

    for (counter, summary_id) in summary_ids.iter().enumerate() {
        info!(
            "Processing summary {}/{}: {summary_id}",
            counter + 1,
            summary_ids.len()
        );

        let summary_file = workspace.join(format!("summary_{}.json", counter + 1));
        let mut get_args = string_args(&[
            "xcresulttool",
            "get",
            "--id",
            summary_id.as_str(),
            "--path",
            path_arg(bundle)?,
            "--format",
            "json",
        ]);
        push_legacy_flag(&mut get_args, legacy_flag);
        let fetched = runner
            .run(XCRUN, &get_args, OutputTo::File(&summary_file))
            .with_context(|| format!("fetch test summary {summary_id}"))?;
        if let Some(stderr) = fetched.stderr {
            bail!("fetching test summary {summary_id} reported: {}", stderr.trim());
        }

        let summary_data = fs::read_to_string(&summary_file)
            .with_context(|| format!("read {}", summary_file.display()))?;
        let legacy_entry = legacy::decode_summary(&summary_data)
            .with_context(|| format!("decode test summary {summary_id}"))?;
        fs::remove_file(&summary_file)
            .with_context(|| format!("remove {}", summary_file.display()))?;

        for attachment in &legacy_entry.attachments {
            // Per-attachment exports carry their own index/uuid
            // disambiguator; strip it so reconciliation sees the same
            // convention names the manifest flow produces.
            let export_file = strip_index_uuid(
                &attachments_dir.join(&attachment.suggested_human_readable_name),
            );
            let mut export_args = string_args(&[
                "xcresulttool",
                "export",
                "--path",
                path_arg(bundle)?,
                "--id",
                attachment.payload_reference_id.as_str(),
                "--type",
                "file",
                "--output-path",
                path_arg(&export_file)?,
            ]);
            push_legacy_flag(&mut export_args, legacy_flag);
            runner
                .run(XCRUN, &export_args, OutputTo::Capture)
                .with_context(|| {
                    format!("export attachment {}", attachment.payload_reference_id)
                })?;
        }

        entries.push(Entry::from(legacy_entry));
    }

    Ok(entries)
}

fn string_args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| (*part).to_string()).collect()
}

fn push_legacy_flag(args: &mut Vec<String>, legacy_flag: bool) {
    if legacy_flag {
        args.push("--legacy".to_string());
    }
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("path {} is not valid UTF-8", path.display()))
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
