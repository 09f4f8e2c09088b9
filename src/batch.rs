//! Multi-pattern batch runs: gather → hash → group → resolve, in strict
//! phase order so interactive prompts only ever surface in phase 4.
//!
//! Generalizes the teacher's single-pattern `main.rs` control flow (scan,
//! diff, confirm, sync) to many patterns sharing one hashing pass, grounded
//! on `core.rs::scan_directory_with_excludes`'s "collect per-file errors,
//! keep going" shape for the gather/hash phases.

use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::finder;
use crate::fs_port::FsPort;
use crate::grouper::{self, VersionSet};
use crate::hash::FileHash;
use crate::orchestrator::{self, SessionOutcome};
use crate::ports::{ContinuePort, MergePort, StatusPort};
use std::collections::HashMap;
use std::path::PathBuf;

/// What happened for a single pattern, carrying the counts and message every
/// recoverable outcome (including a failed one) surfaces through.
pub struct PatternResult {
    pub pattern: String,
    /// Files the Finder matched before any hashing or grouping happened.
    pub files_found: usize,
    /// Distinct content-versions the Grouper produced from those files.
    pub unique_versions: usize,
    /// `false` for a pattern that failed to resolve cleanly (every match
    /// failed to hash, a write-back partially failed); never `false` for a
    /// no-op like "no files" or "already identical".
    pub success: bool,
    /// Human-readable summary, always present regardless of `success`.
    pub message: String,
    /// Set when the orchestrator actually ran for this pattern.
    pub merge_result: Option<SessionOutcome>,
    /// The merged content's hash, set only when a merge produced one.
    pub final_hash: Option<FileHash>,
}

impl PatternResult {
    fn no_files(pattern: String) -> Self {
        Self {
            pattern,
            files_found: 0,
            unique_versions: 0,
            success: true,
            message: "no files found".to_string(),
            merge_result: None,
            final_hash: None,
        }
    }

    fn skipped(pattern: String, files_found: usize, unique_versions: usize) -> Self {
        Self {
            pattern,
            files_found,
            unique_versions,
            success: true,
            message: "skipped, user declined to continue".to_string(),
            merge_result: None,
            final_hash: None,
        }
    }

    fn failed(pattern: String, files_found: usize, message: String) -> Self {
        Self { pattern, files_found, unique_versions: 0, success: false, message, merge_result: None, final_hash: None }
    }

    fn single_file(pattern: String, files_found: usize) -> Self {
        Self {
            pattern,
            files_found,
            unique_versions: 1,
            success: true,
            message: "single file, nothing to merge".to_string(),
            merge_result: None,
            final_hash: None,
        }
    }

    fn identical(pattern: String, files_found: usize) -> Self {
        Self {
            pattern,
            files_found,
            unique_versions: 1,
            success: true,
            message: "already identical".to_string(),
            merge_result: None,
            final_hash: None,
        }
    }

    fn resolved(pattern: String, files_found: usize, unique_versions: usize, outcome: SessionOutcome) -> Self {
        match outcome {
            SessionOutcome::Done { final_hash, write_results, final_content } => {
                let failed = write_results.iter().filter(|(_, r)| r.is_err()).count();
                let success = failed == 0;
                let message = if success {
                    format!("merged {unique_versions} versions, {} files written", write_results.len())
                } else {
                    format!("merged {unique_versions} versions, {failed} write(s) failed")
                };
                Self {
                    pattern,
                    files_found,
                    unique_versions,
                    success,
                    message,
                    final_hash: Some(final_hash.clone()),
                    merge_result: Some(SessionOutcome::Done { final_hash, write_results, final_content }),
                }
            },
            SessionOutcome::Cancelled => Self {
                pattern,
                files_found,
                unique_versions,
                success: true,
                message: "cancelled, no files written".to_string(),
                merge_result: Some(SessionOutcome::Cancelled),
                final_hash: None,
            },
        }
    }
}

pub struct BatchResult {
    pub per_pattern: Vec<PatternResult>,
}

/// Run every pattern in `batch` through the four discrete phases, emitting
/// one banner per phase via `progress` before phase 4 starts running
/// per-pattern interactive prompts.
pub fn process(
    fs: &dyn FsPort,
    batch: &BatchConfig,
    merge_port: &dyn MergePort,
    status_port: &dyn StatusPort,
    continue_port: &dyn ContinuePort,
    mut progress: impl FnMut(&str),
) -> Result<BatchResult, BatchError> {
    if batch.patterns.is_empty() {
        return Err(BatchError::EmptyPatterns);
    }
    if !fs.exists(&batch.root) || !fs.is_dir(&batch.root) {
        return Err(BatchError::UnreadableSearchPath(batch.root.clone()));
    }

    progress("PHASE 1: Gathering files");
    let mut files_by_pattern: Vec<(String, Vec<PathBuf>)> = Vec::with_capacity(batch.patterns.len());
    for pattern in &batch.patterns {
        let found = finder::find(&batch.root, pattern, &batch.exclusions).unwrap_or_default();
        if found.is_empty() && batch.skip_empty_patterns {
            continue;
        }
        files_by_pattern.push((pattern.clone(), found));
    }

    progress("PHASE 2: Hashing");
    let mut distinct_paths: Vec<PathBuf> =
        files_by_pattern.iter().flat_map(|(_, files)| files.iter().cloned()).collect();
    distinct_paths.sort();
    distinct_paths.dedup();

    let mut memo: HashMap<PathBuf, (FileHash, bool)> = HashMap::with_capacity(distinct_paths.len());
    for path in &distinct_paths {
        if let Ok(hashed) = grouper::hash_and_crlf(path) {
            memo.insert(path.clone(), hashed);
        }
    }

    progress("PHASE 3: Grouping files by content");
    let mut version_sets: Vec<(String, usize, VersionSet)> = Vec::with_capacity(files_by_pattern.len());
    for (pattern, files) in &files_by_pattern {
        let entries = files
            .iter()
            .filter_map(|path| memo.get(path).map(|(hash, crlf)| (path.clone(), hash.clone(), *crlf)))
            .collect();
        let outcome = grouper::group_from_hashed(entries);
        grouper::emit_collisions(&outcome.collisions, status_port);
        version_sets.push((pattern.clone(), files.len(), outcome.version_set));
    }

    progress("PHASE 4: Resolving conflicts");
    let mut per_pattern = Vec::with_capacity(version_sets.len());
    for (pattern, files_found, version_set) in version_sets {
        if batch.prompt_before_each_pattern && !continue_port.should_continue() {
            let unique_versions = version_set.len();
            per_pattern.push(PatternResult::skipped(pattern, files_found, unique_versions));
            continue;
        }

        let result =
            classify_and_resolve(pattern, files_found, fs, &version_set, merge_port, status_port, continue_port);
        per_pattern.push(result);
    }

    Ok(BatchResult { per_pattern })
}

fn classify_and_resolve(
    pattern: String,
    files_found: usize,
    fs: &dyn FsPort,
    version_set: &VersionSet,
    merge_port: &dyn MergePort,
    status_port: &dyn StatusPort,
    continue_port: &dyn ContinuePort,
) -> PatternResult {
    let grouped_files: usize = version_set.iter().map(|g| g.paths.len()).sum();
    let unique_versions = version_set.len();

    if files_found == 0 {
        return PatternResult::no_files(pattern);
    }
    if grouped_files == 0 {
        return PatternResult::failed(pattern, files_found, "every matched file failed to hash".to_string());
    }
    if grouped_files == 1 {
        return PatternResult::single_file(pattern, files_found);
    }
    if unique_versions == 1 {
        return PatternResult::identical(pattern, files_found);
    }

    let outcome = orchestrator::run_iterative(fs, version_set, merge_port, status_port, continue_port);
    PatternResult::resolved(pattern, files_found, unique_versions, outcome)
}
