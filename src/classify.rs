//! Attachment filename classification.
//!
//! Baseline attachments follow a fixed convention:
//! `<key>.(baseline|baseline_manifest)_<index>_<UUID>.json`. The key is the
//! join point between a baseline image and the automation descriptor produced
//! for the same test case; everything not matching the convention is simply
//! not a baseline attachment.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Which half of a baseline pairing a convention-matching name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Baseline,
    Manifest,
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(.+?)\.(baseline|baseline_manifest)_\d+_[A-Fa-f0-9-]{36}\.json$")
            .expect("attachment name pattern")
    })
}

fn index_uuid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"_\d+_[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}$",
        )
        .expect("index/uuid suffix pattern")
    })
}

/// Split a human-readable attachment name into its grouping key and kind.
///
/// Returns `None` for names outside the convention; most exported
/// attachments (screenshots, logs) are unrelated to baselines and that is
/// not an error.
pub fn parse_attachment_name(name: &str) -> Option<(String, Kind)> {
    let caps = name_regex().captures(name)?;
    let kind = match caps.get(2)?.as_str() {
        "baseline" => Kind::Baseline,
        "baseline_manifest" => Kind::Manifest,
        _ => return None,
    };
    Some((caps.get(1)?.as_str().to_string(), kind))
}

/// Strip a trailing `_<index>_<UUID>` from the file stem, keeping the
/// directory and extension intact.
///
/// Legacy per-attachment exports carry their own disambiguator, e.g.
/// `Tests.test_x.1178x2556.baseline_0_A4A0FEBF-BD4F-404C-A999-D437A294B483.json`
/// becomes `Tests.test_x.1178x2556.baseline.json`. Names without the suffix
/// pass through unchanged.
pub fn strip_index_uuid(path: &Path) -> PathBuf {
    let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
        return path.to_path_buf();
    };
    let cleaned = index_uuid_regex().replace(stem, "");
    if cleaned == stem {
        return path.to_path_buf();
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => path.with_file_name(format!("{cleaned}.{ext}")),
        None => path.with_file_name(cleaned.into_owned()),
    }
}
