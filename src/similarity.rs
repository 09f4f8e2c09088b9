//! Pair score ∈ [0,1] from line sets + diff counts; "most-similar-next"
//! pair selection for the iterative orchestrator.

use crate::differ::{count_changes, diff};
use crate::error::MergeError;
use crate::fs_port::FsPort;
use crate::grouper::VersionSet;
use crate::line_seq::LineSeq;
use ahash::HashMap;
use std::path::Path;

/// `s = |common_lines_multiset| / max(|A|,|B|)`. Both empty scores 1;
/// exactly one empty scores 0. Symmetric and deterministic.
pub fn score(a: &LineSeq, b: &LineSeq) -> f64 {
    let a_lines = a.lines();
    let b_lines = b.lines();

    if a_lines.is_empty() && b_lines.is_empty() {
        return 1.0;
    }
    if a_lines.is_empty() || b_lines.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<&str, i64> = HashMap::default();
    for line in a_lines {
        *counts.entry(line.as_str()).or_insert(0) += 1;
    }

    let mut common = 0i64;
    for line in b_lines {
        if let Some(remaining) = counts.get_mut(line.as_str()) {
            if *remaining > 0 {
                *remaining -= 1;
                common += 1;
            }
        }
    }

    common as f64 / a_lines.len().max(b_lines.len()) as f64
}

/// A selected pair of distinct groups (by index into the input
/// `VersionSet`) and their similarity score.
#[derive(Debug, Clone)]
pub struct SimilarPair {
    pub left: usize,
    pub right: usize,
    pub score: f64,
}

/// O(K²) pairwise scan over `version_set`'s representative content,
/// returning the highest-scoring pair. Ties break by (smaller `a_changed`
/// line count when diffing the pair, then lexicographic hash).
pub fn most_similar_pair(fs: &dyn FsPort, version_set: &VersionSet) -> Result<SimilarPair, MergeError> {
    if version_set.len() < 2 {
        return Err(MergeError::NotEnoughVersions { found: version_set.len() });
    }

    let representatives: Vec<LineSeq> = version_set
        .iter()
        .map(|group| representative(fs, &group.paths[0]))
        .collect();

    let mut best: Option<SimilarPair> = None;

    for i in 0..version_set.len() {
        for j in (i + 1)..version_set.len() {
            let candidate_score = score(&representatives[i], &representatives[j]);
            let candidate = SimilarPair { left: i, right: j, score: candidate_score };

            best = Some(match best {
                None => candidate,
                Some(current) => {
                    pick_better(fs, version_set, &representatives, current, candidate)
                },
            });
        }
    }

    Ok(best.expect("at least one pair exists when len >= 2"))
}

fn pick_better(
    fs: &dyn FsPort,
    version_set: &VersionSet,
    representatives: &[LineSeq],
    current: SimilarPair,
    candidate: SimilarPair,
) -> SimilarPair {
    if candidate.score > current.score {
        return candidate;
    }
    if candidate.score < current.score {
        return current;
    }

    let current_changed = count_changes(&diff(&representatives[current.left], &representatives[current.right])).0;
    let candidate_changed =
        count_changes(&diff(&representatives[candidate.left], &representatives[candidate.right])).0;

    if candidate_changed != current_changed {
        return if candidate_changed < current_changed { candidate } else { current };
    }

    let _ = fs;
    let current_key = (&version_set[current.left].hash, &version_set[current.right].hash);
    let candidate_key = (&version_set[candidate.left].hash, &version_set[candidate.right].hash);
    if candidate_key < current_key {
        candidate
    } else {
        current
    }
}

/// O(K) scan: the single group most similar to the rolling accumulator.
/// Fails with [`MergeError::NotEnoughVersions`] if `version_set` is empty.
pub fn most_similar_to(
    fs: &dyn FsPort,
    accumulator: &LineSeq,
    version_set: &VersionSet,
) -> Result<usize, MergeError> {
    if version_set.is_empty() {
        return Err(MergeError::NotEnoughVersions { found: 0 });
    }

    let mut best_index = 0;
    let mut best_score = f64::NEG_INFINITY;
    let mut best_changed = usize::MAX;

    for (idx, group) in version_set.iter().enumerate() {
        let candidate = representative(fs, &group.paths[0]);
        let candidate_score = score(accumulator, &candidate);
        let changed = count_changes(&diff(accumulator, &candidate)).0;

        let better = candidate_score > best_score
            || (candidate_score == best_score && changed < best_changed)
            || (candidate_score == best_score
                && changed == best_changed
                && group.hash < version_set[best_index].hash);

        if better {
            best_index = idx;
            best_score = candidate_score;
            best_changed = changed;
        }
    }

    Ok(best_index)
}

fn representative(fs: &dyn FsPort, path: &Path) -> LineSeq {
    fs.read_lines(path).unwrap_or_default()
}
