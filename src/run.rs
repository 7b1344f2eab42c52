//! One-shot export run: workspace lifecycle and pipeline control flow.
//!
//! Locate the bundle, probe the tool, extract attachments through whichever
//! branch the probe selects, reconcile, report the copied count. The whole
//! run happens inside a private temporary workspace that is removed when the
//! run ends, success or failure.

use anyhow::{Context, Result};
use std::fs;
use tempfile::TempDir;
use tracing::{error, info, warn};

use crate::cli::RootArgs;
use crate::extract::{export_legacy, export_modern, is_export_attachments_available, XCRUN};
use crate::locate::resolve_bundle;
use crate::reconcile::{build_mappings, copy_baselines};
use crate::tool::{CommandRunner, ToolRunner};

/// Entry point used by `main`: resolves the real tool and runs.
pub fn run(args: &RootArgs) -> Result<()> {
    which::which(XCRUN).with_context(|| format!("locate {XCRUN} on PATH"))?;
    run_with_runner(args, &CommandRunner)
}

pub fn run_with_runner(args: &RootArgs, runner: &dyn ToolRunner) -> Result<()> {
    // Dropping the guard removes the workspace on every exit path.
    let workspace = TempDir::with_prefix("export-baselines-").context("create workspace")?;
    let attachments_dir = workspace.path().join("attachments");
    fs::create_dir_all(&attachments_dir)
        .with_context(|| format!("create {}", attachments_dir.display()))?;

    if !args.xcresult_path.exists() {
        error!("Unable to locate '{}'", args.xcresult_path.display());
        return Ok(());
    }

    let Some(bundle) = resolve_bundle(&args.xcresult_path)? else {
        error!(
            "Unable to locate .xcresult folder using: '{}'",
            args.xcresult_path.display()
        );
        return Ok(());
    };
    info!("Resolved '.xcresult' path as: {}", bundle.display());

    let bulk_export = is_export_attachments_available(runner, workspace.path())?;
    info!("export attachments available: {bulk_export}");

    let entries = if bulk_export {
        match export_modern(runner, &bundle, workspace.path(), &attachments_dir)? {
            Some(entries) => entries,
            // Missing manifest was already logged; end with zero copies.
            None => return Ok(()),
        }
    } else {
        export_legacy(
            runner,
            &bundle,
            workspace.path(),
            &attachments_dir,
            args.legacy,
        )?
    };

    let mappings = build_mappings(&entries);
    let copied = copy_baselines(&mappings, &attachments_dir, args.baseline_dir.as_deref())?;

    if copied == 0 {
        if bulk_export {
            warn!("No baseline attachments found in manifest.");
        } else {
            warn!("No baseline attachments found in '{}'.", bundle.display());
        }
    } else {
        info!("Done. Saved {copied} baseline file(s) to their target directories.");
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
