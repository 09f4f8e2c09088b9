//! Glob+exclude directory walk → file-path list.
//!
//! Generalizes the teacher's `ignore::WalkBuilder` + `OverrideBuilder`
//! pattern from `scan_directory_with_excludes` (which scanned "everything"
//! for a sync tool) into a single-pattern finder with the spec's default
//! noise exclusions layered underneath user-supplied ones.

use globset::Glob;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directories/paths pruned on every walk regardless of user exclusions.
const DEFAULT_EXCLUSIONS: &[&str] = &["**/.git/**", "**/node_modules/**", "**/bin/**", "**/obj/**"];

const GLOB_MARKERS: &[char] = &['*', '?', '[', '{'];

#[derive(Error, Debug)]
pub enum FinderError {
    #[error("invalid glob pattern '{pattern}': {cause}")]
    InvalidPattern { pattern: String, cause: globset::Error },

    #[error("invalid exclusion pattern '{pattern}': {cause}")]
    InvalidExclusion { pattern: String, cause: ignore::Error },

    #[error("root does not exist: {0}")]
    RootNotFound(PathBuf),
}

/// Find every file under `root` (recursively) whose basename matches
/// `name_or_glob`, skipping anything matched by a default or user exclusion.
///
/// `progress` is called once per matched file, in no particular order (it
/// fires during the walk, before the final deterministic sort). Results are
/// always returned sorted by path string ascending.
pub fn find(
    root: &Path,
    name_or_glob: &str,
    exclusions: &[String],
) -> Result<Vec<PathBuf>, FinderError> {
    find_with_progress(root, name_or_glob, exclusions, |_| {})
}

pub fn find_with_progress(
    root: &Path,
    name_or_glob: &str,
    exclusions: &[String],
    mut progress: impl FnMut(&Path),
) -> Result<Vec<PathBuf>, FinderError> {
    if !root.exists() {
        return Err(FinderError::RootNotFound(root.to_path_buf()));
    }

    let matcher = if is_glob(name_or_glob) {
        Some(Glob::new(name_or_glob).map_err(|cause| FinderError::InvalidPattern {
            pattern: name_or_glob.to_string(),
            cause,
        })?.compile_matcher())
    } else {
        None
    };

    let mut override_builder = OverrideBuilder::new(root);
    for pattern in DEFAULT_EXCLUSIONS.iter().copied().chain(exclusions.iter().map(String::as_str)) {
        override_builder.add(&format!("!{pattern}")).map_err(|cause| {
            FinderError::InvalidExclusion { pattern: pattern.to_string(), cause }
        })?;
    }
    let overrides = override_builder
        .build()
        .map_err(|cause| FinderError::InvalidExclusion { pattern: "<build>".into(), cause })?;

    let mut builder = WalkBuilder::new(root);
    builder.hidden(false).git_ignore(false).git_exclude(false).follow_links(true).overrides(overrides);

    let mut matched = Vec::new();
    for entry in builder.build() {
        let Ok(entry) = entry else { continue };
        let Some(file_type) = entry.file_type() else { continue };
        if !file_type.is_file() {
            continue;
        }
        let path = entry.path();
        let basename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        let is_match = match &matcher {
            Some(glob) => glob.is_match(basename),
            None => basename == name_or_glob,
        };

        if is_match {
            progress(path);
            matched.push(path.to_path_buf());
        }
    }

    matched.sort();
    Ok(matched)
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_MARKERS)
}
