//! Shared harness for end-to-end tests.
//!
//! Places a scripted `xcrun` stand-in first on `PATH` and runs the real
//! binary against it. The script serves fixture documents from a directory
//! the test populates, selected by `FAKE_XCRUN_MODE` (`modern` or `legacy`).

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const FAKE_XCRUN: &str = r#"#!/bin/sh
set -eu
fixtures="$FAKE_XCRUN_FIXTURES"
mode="$FAKE_XCRUN_MODE"

[ "$1" = "xcresulttool" ] || { echo "unexpected tool: $1" >&2; exit 64; }
shift
cmd="$1"; shift

case "$cmd" in
  export)
    if [ "${1:-}" = "--help" ]; then
      if [ "$mode" = "modern" ]; then
        echo "SUBCOMMANDS:"
        echo "  attachments  Export every attachment from a result bundle"
      else
        echo "OVERVIEW: Export File or Directory from Result Bundle"
      fi
      exit 0
    fi
    if [ "${1:-}" = "attachments" ]; then
      shift
      out=""
      while [ $# -gt 0 ]; do
        case "$1" in
          --output-path) out="$2"; shift 2 ;;
          *) shift ;;
        esac
      done
      mkdir -p "$out"
      cp "$fixtures/attachments/"* "$out"/
      exit 0
    fi
    out=""; id=""
    while [ $# -gt 0 ]; do
      case "$1" in
        --output-path) out="$2"; shift 2 ;;
        --id) id="$2"; shift 2 ;;
        *) shift ;;
      esac
    done
    cp "$fixtures/payloads/$id" "$out"
    ;;
  graph)
    cat "$fixtures/graph.txt"
    ;;
  get)
    id=""
    while [ $# -gt 0 ]; do
      case "$1" in
        --id) id="$2"; shift 2 ;;
        *) shift ;;
      esac
    done
    cat "$fixtures/summaries/$id.json"
    ;;
  *)
    echo "unexpected sub-command: $cmd" >&2
    exit 64
    ;;
esac
"#;

/// One test's private world: fake tool, fixtures, and scratch space.
pub struct Harness {
    root: TempDir,
    mode: &'static str,
}

impl Harness {
    pub fn new(mode: &'static str) -> Self {
        let root = TempDir::with_prefix("export-baselines-e2e-").expect("create harness dir");

        let bin_dir = root.path().join("bin");
        fs::create_dir_all(&bin_dir).expect("create bin dir");
        let xcrun = bin_dir.join("xcrun");
        fs::write(&xcrun, FAKE_XCRUN).expect("write fake xcrun");
        fs::set_permissions(&xcrun, fs::Permissions::from_mode(0o755))
            .expect("mark fake xcrun executable");

        for sub_dir in ["fixtures", "fixtures/attachments", "fixtures/summaries", "fixtures/payloads"] {
            fs::create_dir_all(root.path().join(sub_dir)).expect("create fixture dir");
        }

        Self { root, mode }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn fixtures(&self) -> PathBuf {
        self.root.path().join("fixtures")
    }

    pub fn write_fixture(&self, rel_path: &str, content: &str) {
        fs::write(self.fixtures().join(rel_path), content).expect("write fixture");
    }

    /// Create an (empty) result bundle directory and return its path.
    pub fn make_bundle(&self, name: &str) -> PathBuf {
        let bundle = self.root.path().join(name);
        fs::create_dir_all(&bundle).expect("create bundle dir");
        bundle
    }

    /// Run the compiled binary with the fake tool first on PATH.
    pub fn run_exporter(&self, args: &[&str]) -> Output {
        let bin_dir = self.root.path().join("bin");
        let original_path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![bin_dir];
        paths.extend(std::env::split_paths(&original_path));
        let path_var = std::env::join_paths(paths).expect("join PATH");

        Command::new(env!("CARGO_BIN_EXE_export-baselines"))
            .args(args)
            .env("PATH", path_var)
            .env("FAKE_XCRUN_MODE", self.mode)
            .env("FAKE_XCRUN_FIXTURES", self.fixtures())
            .env_remove("RUST_LOG")
            .output()
            .expect("run export-baselines")
    }
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
