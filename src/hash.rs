//! Streaming content hash of a file or byte stream.
//!
//! FNV-1a 64-bit over raw bytes, 4 KiB buffered reads. Not
//! collision-resistant by design (see [`crate::grouper`]'s byte-compare
//! fallback); chosen because the spec mandates it over a cryptographic hash.

use crate::error::HashError;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
const HASH_BUFFER_SIZE: usize = 4 * 1024;

/// A fixed-length hex string: lower-case, zero-padded, 16 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHash(String);

impl FileHash {
    fn from_u64(value: u64) -> Self {
        Self(format!("{value:016x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Streaming FNV-1a 64-bit hasher.
pub struct Hasher {
    state: u64,
}

impl Hasher {
    pub fn new() -> Self {
        Self { state: FNV_OFFSET_BASIS }
    }

    /// Update the running hash with a chunk of bytes.
    pub fn update(&mut self, data: &[u8]) {
        let mut state = self.state;
        for &byte in data {
            state ^= u64::from(byte);
            state = state.wrapping_mul(FNV_PRIME);
        }
        self.state = state;
    }

    /// Hash the contents of a file using streaming I/O in 4 KiB chunks.
    pub fn hash_file(&mut self, path: &Path) -> std::io::Result<()> {
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
        let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            self.update(&buffer[..bytes_read]);
        }

        Ok(())
    }

    pub fn finalize(self) -> FileHash {
        FileHash::from_u64(self.state)
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash a file, surfacing a tagged [`HashError`] on read failure rather than
/// a bare `io::Error` — the Grouper drops and reports these per-file.
pub fn hash_file(path: &Path) -> Result<FileHash, HashError> {
    let mut hasher = Hasher::new();
    hasher.hash_file(path).map_err(|cause| HashError::HashFailed { path: path.to_path_buf(), cause })?;
    Ok(hasher.finalize())
}

/// Hash bytes directly (used for in-memory comparisons and tests).
pub fn hash_bytes(data: &[u8]) -> FileHash {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn known_vector_empty_string() {
        // FNV-1a 64 of the empty string is the offset basis itself.
        assert_eq!(hash_bytes(b"").as_str(), "cbf29ce484222325");
    }

    #[test]
    fn known_vector_single_byte() {
        // offset_basis XOR 'a' (0x61), then * prime.
        let expected = (FNV_OFFSET_BASIS ^ 0x61).wrapping_mul(FNV_PRIME);
        assert_eq!(hash_bytes(b"a").as_str(), format!("{expected:016x}"));
    }

    #[test]
    fn deterministic_across_calls() {
        let data = b"blast merge deterministic hash";
        assert_eq!(hash_bytes(data), hash_bytes(data));
    }

    #[test]
    fn different_data_different_hash() {
        assert_ne!(hash_bytes(b"foo"), hash_bytes(b"bar"));
    }

    #[test]
    fn incremental_matches_whole() {
        let mut incremental = Hasher::new();
        incremental.update(b"hello ");
        incremental.update(b"world");
        assert_eq!(incremental.finalize(), hash_bytes(b"hello world"));
    }

    #[test]
    fn file_hash_matches_byte_hash() -> std::io::Result<()> {
        let mut file = NamedTempFile::new()?;
        let data = b"streamed via 4KiB chunks, hopefully more than once";
        file.write_all(data)?;
        file.flush()?;

        let from_file = hash_file(file.path()).expect("hash should succeed");
        assert_eq!(from_file, hash_bytes(data));
        Ok(())
    }

    #[test]
    fn file_hash_spans_multiple_buffers() -> std::io::Result<()> {
        let mut file = NamedTempFile::new()?;
        let chunk = vec![0x42u8; HASH_BUFFER_SIZE];
        for _ in 0..5 {
            file.write_all(&chunk)?;
        }
        file.flush()?;

        let mut expected = Vec::new();
        for _ in 0..5 {
            expected.extend_from_slice(&chunk);
        }

        let from_file = hash_file(file.path()).expect("hash should succeed");
        assert_eq!(from_file, hash_bytes(&expected));
        Ok(())
    }

    #[test]
    fn hash_display_is_lowercase_hex_16() {
        let hash = hash_bytes(b"test");
        let shown = format!("{hash}");
        assert_eq!(shown.len(), 16);
        assert!(shown.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
