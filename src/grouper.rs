//! Hash files in parallel, bucket by hash → [`VersionSet`].

use crate::error::HashError;
use crate::hash::{hash_bytes, FileHash};
use crate::ports::{StatusEvent, StatusPort};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bound on the worker pool used for hashing and write-back, mirroring the
/// teacher's `rayon::ThreadPoolBuilder` usage in `main.rs`.
pub fn pool_size() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1).min(16)
}

/// All paths in a group have byte-identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub hash: FileHash,
    pub paths: Vec<PathBuf>,
    /// True if a majority of this group's member files used CRLF line
    /// endings — consulted by write-back when restoring the final content.
    pub had_crlf: bool,
}

/// One per distinct hash, ordered by group size descending then hash
/// ascending.
pub type VersionSet = Vec<FileGroup>;

/// Two paths whose FNV-1a hashes collided but whose contents differ, per
/// the byte-compare fallback mandated by spec.md §9.
#[derive(Debug, Clone)]
pub struct Collision {
    pub first: PathBuf,
    pub second: PathBuf,
}

/// Result of grouping, including everything that went wrong along the way.
/// Hash failures are dropped from `version_set` rather than aborting the
/// whole call, per spec.md §4.4.
#[derive(Debug, Default)]
pub struct GroupOutcome {
    pub version_set: VersionSet,
    pub hash_errors: Vec<HashError>,
    pub collisions: Vec<Collision>,
}

/// Hash every path in parallel (bounded pool) and bucket them by content
/// hash, with a byte-compare fallback to split apart any hash collision.
pub fn group_by_hash(paths: &[PathBuf]) -> GroupOutcome {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(pool_size())
        .build()
        .expect("bounded pool construction should not fail");

    let hashed: Vec<Result<(PathBuf, FileHash, bool), HashError>> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| hash_and_crlf(path).map(|(hash, crlf)| (path.clone(), hash, crlf)))
            .collect()
    });

    let mut hash_errors = Vec::new();
    let mut entries = Vec::with_capacity(hashed.len());
    for result in hashed {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => hash_errors.push(e),
        }
    }

    let mut outcome = group_from_hashed(entries);
    outcome.hash_errors = hash_errors;
    outcome
}

/// Bucket already-hashed `(path, hash, had_crlf)` entries, splitting
/// collisions the same way [`group_by_hash`] does. Used by
/// [`crate::batch`] to share one hashing pass across several patterns'
/// worth of gathered files instead of re-hashing per pattern.
pub fn group_from_hashed(entries: Vec<(PathBuf, FileHash, bool)>) -> GroupOutcome {
    let mut buckets: HashMap<FileHash, Vec<(PathBuf, bool)>> = HashMap::new();
    for (path, hash, had_crlf) in entries {
        buckets.entry(hash).or_default().push((path, had_crlf));
    }

    let mut collisions = Vec::new();
    let mut version_set = Vec::with_capacity(buckets.len());

    for (hash, mut members) in buckets {
        members.sort_by(|a, b| a.0.cmp(&b.0));
        let confirmed = split_collisions(&members, &mut collisions);
        for (mut group_paths, had_crlf) in confirmed {
            group_paths.sort();
            version_set.push(FileGroup { hash: hash.clone(), paths: group_paths, had_crlf });
        }
    }

    version_set.sort_by(|a, b| b.paths.len().cmp(&a.paths.len()).then_with(|| a.hash.cmp(&b.hash)));

    GroupOutcome { version_set, hash_errors: Vec::new(), collisions }
}

/// Matches the external interface named in spec.md §6: `group(paths) →
/// VersionSet`, discarding per-file errors (callers that need them should
/// use [`group_by_hash`] directly, as [`crate::batch`] does).
pub fn group(paths: &[PathBuf]) -> VersionSet {
    group_by_hash(paths).version_set
}

/// Same as [`group`], but reports every detected [`Collision`] through
/// `status_port` before returning — the path callers with a live status
/// channel (the CLI's single-pattern `find`, [`crate::batch`]) should use.
pub fn group_with_status(paths: &[PathBuf], status_port: &dyn StatusPort) -> VersionSet {
    let outcome = group_by_hash(paths);
    emit_collisions(&outcome.collisions, status_port);
    outcome.version_set
}

/// Reports each `collision` through `status_port` as a [`StatusEvent::Collision`].
pub fn emit_collisions(collisions: &[Collision], status_port: &dyn StatusPort) {
    for collision in collisions {
        status_port.status(&StatusEvent::Collision {
            first: collision.first.clone(),
            second: collision.second.clone(),
        });
    }
}

/// Split a same-hash bucket into byte-identical sub-groups, recording a
/// [`Collision`] for every pair of paths that turned out not to match.
fn split_collisions(
    members: &[(PathBuf, bool)],
    collisions: &mut Vec<Collision>,
) -> Vec<(Vec<PathBuf>, bool)> {
    let mut groups: Vec<(Vec<u8>, Vec<PathBuf>, usize)> = Vec::new();

    for (path, had_crlf) in members {
        let Ok(bytes) = fs::read(path) else { continue };

        match groups.iter_mut().find(|(rep, _, _)| rep == &bytes) {
            Some((_, paths, crlf_votes)) => {
                paths.push(path.clone());
                if *had_crlf {
                    *crlf_votes += 1;
                }
            },
            None => {
                if let Some((_, first_paths, _)) = groups.first() {
                    collisions.push(Collision {
                        first: first_paths[0].clone(),
                        second: path.clone(),
                    });
                }
                groups.push((bytes, vec![path.clone()], usize::from(*had_crlf)));
            },
        }
    }

    groups
        .into_iter()
        .map(|(_, paths, crlf_votes)| {
            let had_crlf = crlf_votes * 2 > paths.len();
            (paths, had_crlf)
        })
        .collect()
}

/// Read, hash, and CRLF-sniff one file. Exposed so [`crate::batch`] can
/// build a single path→hash memo shared across every pattern in a batch.
pub fn hash_and_crlf(path: &Path) -> Result<(FileHash, bool), HashError> {
    let bytes = fs::read(path).map_err(|cause| HashError::HashFailed { path: path.to_path_buf(), cause })?;
    let had_crlf = bytes.windows(2).any(|w| w == b"\r\n");
    Ok((hash_bytes(&bytes), had_crlf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn groups_identical_files_together() {
        let dir = tempdir().unwrap();
        let p1 = dir.path().join("a.txt");
        let p2 = dir.path().join("b.txt");
        let p3 = dir.path().join("c.txt");
        fs::write(&p1, "same\n").unwrap();
        fs::write(&p2, "same\n").unwrap();
        fs::write(&p3, "different\n").unwrap();

        let outcome = group_by_hash(&[p1, p2, p3]);
        assert_eq!(outcome.version_set.len(), 2);
        assert!(outcome.hash_errors.is_empty());
        assert!(outcome.collisions.is_empty());

        let biggest = &outcome.version_set[0];
        assert_eq!(biggest.paths.len(), 2);
    }

    #[test]
    fn ordering_is_by_size_desc_then_hash_asc() {
        let dir = tempdir().unwrap();
        let p1 = dir.path().join("a.txt");
        let p2 = dir.path().join("b.txt");
        let p3 = dir.path().join("c.txt");
        fs::write(&p1, "x\n").unwrap();
        fs::write(&p2, "x\n").unwrap();
        fs::write(&p3, "y\n").unwrap();

        let outcome = group_by_hash(&[p1, p2, p3]);
        assert_eq!(outcome.version_set[0].paths.len(), 2);
        assert_eq!(outcome.version_set[1].paths.len(), 1);
    }

    #[test]
    fn missing_file_is_dropped_not_fatal() {
        let dir = tempdir().unwrap();
        let real = dir.path().join("real.txt");
        fs::write(&real, "content\n").unwrap();
        let missing = dir.path().join("missing.txt");

        let outcome = group_by_hash(&[real, missing]);
        assert_eq!(outcome.hash_errors.len(), 1);
        assert_eq!(outcome.version_set.len(), 1);
    }

    #[test]
    fn had_crlf_reflects_majority_of_group() {
        let dir = tempdir().unwrap();
        let p1 = dir.path().join("a.txt");
        let p2 = dir.path().join("b.txt");
        fs::write(&p1, "line\r\n").unwrap();
        fs::write(&p2, "line\r\n").unwrap();

        let outcome = group_by_hash(&[p1, p2]);
        assert_eq!(outcome.version_set.len(), 1);
        assert!(outcome.version_set[0].had_crlf);
    }

    #[test]
    fn forced_hash_collision_is_reported_and_splits_the_group() {
        let dir = tempdir().unwrap();
        let p1 = dir.path().join("a.txt");
        let p2 = dir.path().join("b.txt");
        fs::write(&p1, "one\n").unwrap();
        fs::write(&p2, "two\n").unwrap();

        // Fake a hash collision between genuinely different file contents —
        // this is what the byte-compare fallback exists to catch.
        let fake_hash = hash_bytes(b"shared");
        let entries = vec![(p1.clone(), fake_hash.clone(), false), (p2.clone(), fake_hash, false)];
        let outcome = group_from_hashed(entries);

        assert_eq!(outcome.version_set.len(), 2);
        assert_eq!(outcome.collisions.len(), 1);
        assert!(outcome.version_set.iter().all(|g| g.paths.len() == 1));

        struct RecordingStatusPort {
            events: std::sync::Mutex<Vec<StatusEvent>>,
        }
        impl StatusPort for RecordingStatusPort {
            fn status(&self, event: &StatusEvent) {
                self.events.lock().unwrap().push(event.clone());
            }
        }
        let status_port = RecordingStatusPort { events: std::sync::Mutex::new(Vec::new()) };
        emit_collisions(&outcome.collisions, &status_port);

        let events = status_port.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StatusEvent::Collision { .. }));
    }

    #[test]
    fn paths_within_a_group_are_sorted() {
        let dir = tempdir().unwrap();
        let p_z = dir.path().join("z.txt");
        let p_a = dir.path().join("a.txt");
        fs::write(&p_z, "same\n").unwrap();
        fs::write(&p_a, "same\n").unwrap();

        let outcome = group_by_hash(&[p_z.clone(), p_a.clone()]);
        assert_eq!(outcome.version_set[0].paths, vec![p_a, p_z]);
    }
}
