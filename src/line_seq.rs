//! Line-oriented text content: the unit the Differ and MergeEngine operate on.

use std::fmt;

/// An ordered sequence of text lines, with the separator-normalization and
/// trailing-newline bookkeeping the spec's §9 open questions require.
///
/// CRLF is normalized to LF on construction from raw bytes; `had_crlf`
/// records whether the source used CRLF so [`crate::writeback`] can restore
/// it. `trailing_newline` records whether the source's last line was
/// terminated, so a round-trip of an already-terminated file stays
/// terminated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSeq {
    lines: Vec<String>,
    pub had_crlf: bool,
    pub trailing_newline: bool,
}

impl LineSeq {
    pub fn new(lines: Vec<String>, had_crlf: bool, trailing_newline: bool) -> Self {
        Self { lines, had_crlf, trailing_newline }
    }

    /// Parse lossily-decoded UTF-8 text into a `LineSeq`, normalizing CRLF to
    /// LF and recording both side-flags.
    pub fn from_text(text: &str) -> Self {
        let had_crlf = text.contains("\r\n");
        let normalized = text.replace("\r\n", "\n");
        if normalized.is_empty() {
            return Self { lines: Vec::new(), had_crlf, trailing_newline: false };
        }
        let trailing_newline = normalized.ends_with('\n');
        let body = normalized.strip_suffix('\n').unwrap_or(&normalized);
        let lines = if body.is_empty() {
            Vec::new()
        } else {
            body.split('\n').map(str::to_owned).collect()
        };
        Self { lines, had_crlf, trailing_newline }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Render back to text, restoring CRLF if `had_crlf` is set and a
    /// trailing newline if `trailing_newline` is set.
    pub fn to_text(&self) -> String {
        let mut body = self.lines.join("\n");
        if self.trailing_newline && !self.lines.is_empty() {
            body.push('\n');
        }
        if self.had_crlf {
            body = body.replace('\n', "\r\n");
        }
        body
    }

    /// Combine `had_crlf`/`trailing_newline` flags from two input sides,
    /// implementing spec.md §9's "deterministic given the inputs" policy:
    /// a merge keeps CRLF and a trailing newline if either side had it
    /// (majority-of-2 degenerates to "either"), favoring the common case.
    pub fn combine_flags(a: &LineSeq, b: &LineSeq) -> (bool, bool) {
        let had_crlf = a.had_crlf || b.had_crlf;
        let trailing_newline = a.trailing_newline || b.trailing_newline;
        (had_crlf, trailing_newline)
    }
}

impl fmt::Display for LineSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
