//! CLI argument parsing.
//!
//! The CLI is intentionally thin: one positional input plus policy switches.
//! Everything with decision logic lives behind it in `run`.

use clap::Parser;
use std::path::PathBuf;

/// Export XCUITest baseline attachments from an `.xcresult` bundle into
/// their target baseline directories.
#[derive(Parser, Debug)]
#[command(
    name = "export-baselines",
    version,
    about = "Export XCUITest baseline images from an .xcresult bundle to their target directories",
    after_help = "Examples:\n  export-baselines /ci/results/Run.xcresult\n  export-baselines ~/Library/Developer/Xcode/DerivedData/App-abcdef/Build\n  export-baselines Run.xcresult --baseline-dir Tests/Baselines"
)]
pub struct RootArgs {
    /// Path to an .xcresult bundle (CI or Xcode flow) or a build/derived-data
    /// folder to search (Xcode flow)
    #[arg(value_name = "XCRESULT_PATH")]
    pub xcresult_path: PathBuf,

    /// Copy every baseline into this directory instead of the folder named
    /// by its automation descriptor
    #[arg(long, value_name = "DIR")]
    pub baseline_dir: Option<PathBuf>,

    /// Append --legacy to the fallback xcresulttool invocations (needed when
    /// reading legacy-format bundles with Xcode 16+)
    #[arg(long)]
    pub legacy: bool,

    /// Emit debug-level progress logs
    #[arg(long)]
    pub verbose: bool,
}
