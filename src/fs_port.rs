//! The filesystem capability the core consumes from its environment.
//!
//! Generalizes the teacher's free functions in `io.rs`
//! (`atomic_copy_file_with_metadata`, `AtomicWriter`, `fsync_directory`)
//! into a trait so the orchestrator and batch processor can be exercised
//! against an in-memory fake.

use crate::error::FsError;
use crate::line_seq::LineSeq;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Capability set consumed by the core: enumerate, read, write, hash-stream.
///
/// `write` is atomic: write to a temp file in the same directory, fsync,
/// then rename over the destination. Paths are expected to already be
/// canonicalized by the caller.
pub trait FsPort: Send + Sync {
    fn enumerate(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, FsError>;
    fn read_lines(&self, path: &Path) -> Result<LineSeq, FsError>;
    fn write(&self, path: &Path, content: &LineSeq) -> Result<(), FsError>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Real filesystem implementation backing the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }

    /// Walk `dir`, following file symlinks but stopping directory-symlink
    /// cycles: each real inode is descended into at most once per walk.
    fn walk(&self, dir: &Path, recursive: bool, out: &mut Vec<PathBuf>, seen_inodes: &mut std::collections::HashSet<u64>) -> Result<(), FsError> {
        let entries = fs::read_dir(dir).map_err(|cause| io_err(dir, cause))?;
        for entry in entries {
            let entry = entry.map_err(|cause| io_err(dir, cause))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|cause| io_err(&path, cause))?;

            if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
                if !recursive {
                    continue;
                }
                if let Ok(meta) = fs::metadata(&path) {
                    #[cfg(unix)]
                    {
                        use std::os::unix::fs::MetadataExt;
                        if !seen_inodes.insert(meta.ino()) {
                            continue;
                        }
                    }
                    #[cfg(not(unix))]
                    let _ = meta;
                }
                self.walk(&path, recursive, out, seen_inodes)?;
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                out.push(path);
            }
        }
        Ok(())
    }
}

fn io_err(path: &Path, cause: std::io::Error) -> FsError {
    match cause.kind() {
        std::io::ErrorKind::NotFound => FsError::PathNotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => FsError::AccessDenied(path.to_path_buf()),
        _ => FsError::IoFailure { path: path.to_path_buf(), cause },
    }
}

impl FsPort for RealFs {
    fn enumerate(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, FsError> {
        let mut out = Vec::new();
        let mut seen_inodes = std::collections::HashSet::new();
        self.walk(dir, recursive, &mut out, &mut seen_inodes)?;
        Ok(out)
    }

    fn read_lines(&self, path: &Path) -> Result<LineSeq, FsError> {
        let bytes = fs::read(path).map_err(|cause| io_err(path, cause))?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(LineSeq::from_text(&text))
    }

    fn write(&self, path: &Path, content: &LineSeq) -> Result<(), FsError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let pid = std::process::id();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = dir.join(format!(".blastmerge-{pid}-{counter}.tmp"));

        {
            let file = File::create(&temp_path).map_err(|cause| io_err(&temp_path, cause))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(content.to_text().as_bytes())
                .map_err(|cause| io_err(&temp_path, cause))?;
            writer.flush().map_err(|cause| io_err(&temp_path, cause))?;
            writer.get_ref().sync_all().map_err(|cause| io_err(&temp_path, cause))?;
        }

        fs::rename(&temp_path, path).map_err(|cause| {
            let _ = fs::remove_file(&temp_path);
            io_err(path, cause)
        })?;

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Stream a file's bytes in 4 KiB chunks, for callers that want raw access
/// without going through [`FsPort::read_lines`]'s text decoding (e.g. the
/// hasher).
pub fn read_bytes_stream(path: &Path) -> Result<Vec<u8>, FsError> {
    let mut file = File::open(path).map_err(|cause| io_err(path, cause))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|cause| io_err(path, cause))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let fs = RealFs::new();
        let content = LineSeq::from_text("one\ntwo\n");
        fs.write(&path, &content).unwrap();
        let read_back = fs.read_lines(&path).unwrap();
        assert_eq!(read_back, content);
    }

    #[test]
    fn write_is_atomic_no_temp_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("b.txt");
        let fs = RealFs::new();
        fs.write(&path, &LineSeq::from_text("x\n")).unwrap();
        let leftover: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().map(|e| e == "tmp").unwrap_or(false))
            .collect();
        assert!(leftover.is_empty());
    }

    #[test]
    fn enumerate_finds_nested_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("top.txt"), "a").unwrap();
        fs::write(dir.path().join("sub/nested.txt"), "b").unwrap();

        let fs_port = RealFs::new();
        let mut found = fs_port.enumerate(dir.path(), true).unwrap();
        found.sort();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn enumerate_non_recursive_skips_subdirs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("top.txt"), "a").unwrap();
        fs::write(dir.path().join("sub/nested.txt"), "b").unwrap();

        let fs_port = RealFs::new();
        let found = fs_port.enumerate(dir.path(), false).unwrap();
        assert_eq!(found.len(), 1);
    }
}
