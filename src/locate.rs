//! Result bundle discovery.
//!
//! The input path is either a direct `.xcresult` bundle (the CI flow) or a
//! build/derived-data directory (the local Xcode flow) whose `Logs/Test`
//! folder holds one bundle per test run.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const BUNDLE_EXTENSION: &str = "xcresult";

/// Resolve the input path to a concrete bundle, or `None` if no bundle can
/// be found. A path already carrying the bundle extension is used as-is.
pub fn resolve_bundle(input: &Path) -> Result<Option<PathBuf>> {
    if input.extension().and_then(|ext| ext.to_str()) == Some(BUNDLE_EXTENSION) {
        return Ok(Some(input.to_path_buf()));
    }
    latest_bundle_in_build_dir(input)
}

/// Find the most recently modified bundle under `<derived-data>/Logs/Test`.
///
/// `path` may also be the nested `Build` folder, in which case its parent is
/// the derived-data root. Equal modification times are broken by picking the
/// lexicographically larger path, so the choice is deterministic.
pub fn latest_bundle_in_build_dir(path: &Path) -> Result<Option<PathBuf>> {
    let is_build_folder = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case("build"));
    let derived_data = if is_build_folder {
        path.parent().unwrap_or(path)
    } else {
        path
    };
    let logs_test = derived_data.join("Logs").join("Test");

    let Ok(dir_entries) = fs::read_dir(&logs_test) else {
        return Ok(None);
    };

    let mut best: Option<(SystemTime, PathBuf)> = None;
    for dir_entry in dir_entries {
        let dir_entry =
            dir_entry.with_context(|| format!("read {}", logs_test.display()))?;
        let entry_path = dir_entry.path();
        if entry_path.extension().and_then(|ext| ext.to_str()) != Some(BUNDLE_EXTENSION) {
            continue;
        }
        let modified = dir_entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let candidate = (modified, entry_path);
        if best.as_ref().is_none_or(|current| candidate > *current) {
            best = Some(candidate);
        }
    }
    Ok(best.map(|(_, entry_path)| entry_path))
}
