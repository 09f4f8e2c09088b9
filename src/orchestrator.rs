//! Drives the pairwise-merge session for one pattern until a single
//! accumulated version remains, then writes it back everywhere.
//!
//! The "pick the closest two, fold in the next closest, repeat" loop has no
//! direct teacher analogue (the teacher syncs two trees, it never unifies
//! K>2 divergent copies) and is built directly from spec's state-machine
//! description, reusing the teacher's "collect per-path errors, don't abort
//! the batch" shape from `core.rs::sync_changes` for the final write phase.

use crate::error::FsError;
use crate::fs_port::FsPort;
use crate::grouper::{FileGroup, VersionSet};
use crate::hash::{hash_bytes, FileHash};
use crate::line_seq::LineSeq;
use crate::ports::{ContinuePort, MergePort, StatusEvent, StatusPort};
use crate::{differ, similarity, writeback};
use std::path::PathBuf;

/// Outcome of running the session to completion.
#[derive(Debug)]
pub enum SessionOutcome {
    Done {
        final_hash: FileHash,
        final_content: LineSeq,
        write_results: Vec<(PathBuf, Result<(), FsError>)>,
    },
    Cancelled,
}

/// Run the iterative merge for a single pattern's [`VersionSet`].
///
/// `K < 2` (zero or one distinct version) short-circuits to `Done` with no
/// writes — there is nothing to unify.
pub fn run_iterative(
    fs: &dyn FsPort,
    version_set: &VersionSet,
    merge_port: &dyn MergePort,
    status_port: &dyn StatusPort,
    continue_port: &dyn ContinuePort,
) -> SessionOutcome {
    if version_set.len() < 2 {
        let final_content = match version_set.first() {
            Some(group) => fs.read_lines(&group.paths[0]).unwrap_or_default(),
            None => LineSeq::default(),
        };
        let final_hash = hash_bytes(final_content.to_text().as_bytes());
        return SessionOutcome::Done { final_hash, final_content, write_results: Vec::new() };
    }

    let mut remaining: VersionSet = version_set.clone();
    let mut accumulator: Option<LineSeq> = None;
    let mut iteration = 1usize;

    loop {
        let merged = match &accumulator {
            None => {
                let pair = match similarity::most_similar_pair(fs, &remaining) {
                    Ok(pair) => pair,
                    Err(_) => return SessionOutcome::Cancelled,
                };
                let repr_left = fs.read_lines(&remaining[pair.left].paths[0]).unwrap_or_default();
                let repr_right = fs.read_lines(&remaining[pair.right].paths[0]).unwrap_or_default();
                let (left_idx, right_idx, left, right) =
                    order_pair(&remaining, pair.left, pair.right, repr_left, repr_right);

                status_port.status(&StatusEvent::Progress {
                    iteration,
                    left: label(&remaining[left_idx]),
                    right: label(&remaining[right_idx]),
                    score: pair.score,
                });

                let result = merge_port.merge(&left, &right, None);
                if result.cancelled {
                    return SessionOutcome::Cancelled;
                }

                let (hi, lo) = if left_idx > right_idx { (left_idx, right_idx) } else { (right_idx, left_idx) };
                remaining.remove(hi);
                remaining.remove(lo);
                result.merged
            },
            Some(acc) => {
                let right_idx = match similarity::most_similar_to(fs, acc, &remaining) {
                    Ok(idx) => idx,
                    Err(_) => return SessionOutcome::Cancelled,
                };
                let right = fs.read_lines(&remaining[right_idx].paths[0]).unwrap_or_default();
                let score = similarity::score(acc, &right);

                status_port.status(&StatusEvent::Progress {
                    iteration,
                    left: "accumulator".to_string(),
                    right: label(&remaining[right_idx]),
                    score,
                });

                let result = merge_port.merge(acc, &right, None);
                if result.cancelled {
                    return SessionOutcome::Cancelled;
                }

                remaining.remove(right_idx);
                result.merged
            },
        };

        accumulator = Some(merged);
        iteration += 1;

        if remaining.is_empty() {
            let final_content = accumulator.expect("just assigned");
            let final_hash = hash_bytes(final_content.to_text().as_bytes());
            let all_targets: Vec<PathBuf> =
                version_set.iter().flat_map(|group: &FileGroup| group.paths.iter().cloned()).collect();
            let write_results = writeback::propagate(fs, &final_content, &all_targets);
            return SessionOutcome::Done { final_hash, final_content, write_results };
        }

        if !continue_port.should_continue() {
            return SessionOutcome::Cancelled;
        }
    }
}

/// Orders the first pair of a session: the representative with fewer
/// `a_changed` lines (diffed against the other as the B side) becomes the
/// left/A side; ties break by lexicographic path.
fn order_pair(
    remaining: &VersionSet,
    i: usize,
    j: usize,
    repr_i: LineSeq,
    repr_j: LineSeq,
) -> (usize, usize, LineSeq, LineSeq) {
    let changed_i_as_a = differ::count_changes(&differ::diff(&repr_i, &repr_j)).0;
    let changed_j_as_a = differ::count_changes(&differ::diff(&repr_j, &repr_i)).0;

    let i_is_left = match changed_i_as_a.cmp(&changed_j_as_a) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => remaining[i].paths[0] <= remaining[j].paths[0],
    };

    if i_is_left {
        (i, j, repr_i, repr_j)
    } else {
        (j, i, repr_j, repr_i)
    }
}

fn label(group: &FileGroup) -> String {
    group.paths[0].display().to_string()
}
