//! Line-level diff (LCS) → ordered sequence of [`Block`].
//!
//! Block/hunk vocabulary grounded on
//! `examples/other_examples/…cNameHitch-gitr…git-diff-src-lib.rs.rs`'s
//! `Hunk`/`DiffLine::{Context,Addition,Deletion}` shape, adapted to the
//! spec's four-variant tagged [`Block`] instead of a flat hunk-of-lines.

use crate::line_seq::LineSeq;

/// A contiguous diff region. Positions are 0-based starting indices into
/// the two input [`LineSeq`]s. Concatenating the "A side" of every block in
/// order reconstructs `a`; same for `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Insert { lines_b: Vec<String>, pos_a: usize, pos_b: usize },
    Delete { lines_a: Vec<String>, pos_a: usize, pos_b: usize },
    Replace { lines_a: Vec<String>, lines_b: Vec<String>, pos_a: usize, pos_b: usize },
    Unchanged { len: usize, pos_a: usize, pos_b: usize },
}

impl Block {
    pub fn pos_a(&self) -> usize {
        match self {
            Block::Insert { pos_a, .. }
            | Block::Delete { pos_a, .. }
            | Block::Replace { pos_a, .. }
            | Block::Unchanged { pos_a, .. } => *pos_a,
        }
    }

    pub fn pos_b(&self) -> usize {
        match self {
            Block::Insert { pos_b, .. }
            | Block::Delete { pos_b, .. }
            | Block::Replace { pos_b, .. }
            | Block::Unchanged { pos_b, .. } => *pos_b,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Block::Unchanged { .. })
    }
}

/// Up to `C` lines of Unchanged context either side of block `i`, clamped at
/// sequence ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockContext {
    pub before_a: Vec<String>,
    pub before_b: Vec<String>,
    pub after_a: Vec<String>,
    pub after_b: Vec<String>,
}

/// Default number of context lines carried either side of a change block.
pub const DEFAULT_CONTEXT: usize = 3;

/// Diff two line sequences into a minimal-edit block sequence via a
/// classic LCS backtrace. Line equality is exact string equality (lines
/// are already CRLF-normalized by [`LineSeq::from_text`]).
pub fn diff(a: &LineSeq, b: &LineSeq) -> Vec<Block> {
    let a_lines = a.lines();
    let b_lines = b.lines();
    let ops = lcs_ops(a_lines, b_lines);
    group_ops(&ops, a_lines, b_lines)
}

enum Op {
    Match,
    Delete,
    Insert,
}

/// Suffix-LCS DP table, O(n*m) time/space — conforming per spec.md §4.5
/// ("any algorithm producing a minimal-edit block sequence"); acceptable
/// for the file sizes this crate merges (source/config files, not
/// multi-gigabyte blobs).
fn lcs_ops(a: &[String], b: &[String]) -> Vec<Op> {
    let n = a.len();
    let m = b.len();
    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if a[i] == b[j] {
                dp[i + 1][j + 1] + 1
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            ops.push(Op::Match);
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            ops.push(Op::Delete);
            i += 1;
        } else {
            ops.push(Op::Insert);
            j += 1;
        }
    }
    while i < n {
        ops.push(Op::Delete);
        i += 1;
    }
    while j < m {
        ops.push(Op::Insert);
        j += 1;
    }
    ops
}

fn group_ops(ops: &[Op], a: &[String], b: &[String]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let (mut i, mut j) = (0usize, 0usize);
    let mut idx = 0;

    while idx < ops.len() {
        match ops[idx] {
            Op::Match => {
                let start_a = i;
                let start_b = j;
                let mut len = 0;
                while idx < ops.len() && matches!(ops[idx], Op::Match) {
                    i += 1;
                    j += 1;
                    len += 1;
                    idx += 1;
                }
                blocks.push(Block::Unchanged { len, pos_a: start_a, pos_b: start_b });
            },
            Op::Delete | Op::Insert => {
                let start_a = i;
                let start_b = j;
                let mut deleted = Vec::new();
                let mut inserted = Vec::new();
                while idx < ops.len() && matches!(ops[idx], Op::Delete | Op::Insert) {
                    match ops[idx] {
                        Op::Delete => {
                            deleted.push(a[i].clone());
                            i += 1;
                        },
                        Op::Insert => {
                            inserted.push(b[j].clone());
                            j += 1;
                        },
                        Op::Match => unreachable!(),
                    }
                    idx += 1;
                }
                blocks.push(match (deleted.is_empty(), inserted.is_empty()) {
                    (false, false) => {
                        Block::Replace { lines_a: deleted, lines_b: inserted, pos_a: start_a, pos_b: start_b }
                    },
                    (false, true) => Block::Delete { lines_a: deleted, pos_a: start_a, pos_b: start_b },
                    (true, false) => Block::Insert { lines_b: inserted, pos_a: start_a, pos_b: start_b },
                    (true, true) => unreachable!("non-match run with no deletes or inserts"),
                });
            },
        }
    }

    blocks
}

/// Slice up to `context` lines of the adjacent Unchanged neighborhoods of
/// `blocks[i]`, clamping at sequence ends.
///
/// Takes the original `a`/`b` sequences alongside `blocks` because an
/// `Unchanged` block only records position and length, not line text.
pub fn block_context(a: &LineSeq, b: &LineSeq, blocks: &[Block], i: usize, context: usize) -> BlockContext {
    let mut ctx = BlockContext::default();

    if i > 0 {
        if let Block::Unchanged { len, pos_a, pos_b } = &blocks[i - 1] {
            let take = (*len).min(context);
            let a_start = pos_a + len - take;
            let b_start = pos_b + len - take;
            ctx.before_a = a.lines()[a_start..a_start + take].to_vec();
            ctx.before_b = b.lines()[b_start..b_start + take].to_vec();
        }
    }

    if i + 1 < blocks.len() {
        if let Block::Unchanged { len, pos_a, pos_b } = &blocks[i + 1] {
            let take = (*len).min(context);
            ctx.after_a = a.lines()[*pos_a..pos_a + take].to_vec();
            ctx.after_b = b.lines()[*pos_b..pos_b + take].to_vec();
        }
    }

    ctx
}

/// Count lines belonging to Delete/Replace (the "a_changed" count) and
/// Insert/Replace (the "b_changed" count).
pub fn count_changes(blocks: &[Block]) -> (usize, usize) {
    let mut a_changed = 0;
    let mut b_changed = 0;
    for block in blocks {
        match block {
            Block::Delete { lines_a, .. } => a_changed += lines_a.len(),
            Block::Insert { lines_b, .. } => b_changed += lines_b.len(),
            Block::Replace { lines_a, lines_b, .. } => {
                a_changed += lines_a.len();
                b_changed += lines_b.len();
            },
            Block::Unchanged { .. } => {},
        }
    }
    (a_changed, b_changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(text: &str) -> LineSeq {
        LineSeq::from_text(text)
    }

    #[test]
    fn idempotent_diff_has_no_change_blocks() {
        let a = seq("alpha\nbeta\ngamma\n");
        let blocks = diff(&a, &a);
        assert!(blocks.iter().all(Block::is_unchanged));
        let covered: usize = blocks
            .iter()
            .map(|b| match b {
                Block::Unchanged { len, .. } => *len,
                _ => 0,
            })
            .sum();
        assert_eq!(covered, a.len());
    }

    #[test]
    fn detects_single_insert() {
        let a = seq("a\nb\nc\n");
        let b = seq("a\nb\nX\nc\n");
        let blocks = diff(&a, &b);

        let inserts: Vec<_> = blocks
            .iter()
            .filter_map(|blk| match blk {
                Block::Insert { lines_b, .. } => Some(lines_b.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(inserts, vec![vec!["X".to_string()]]);
    }

    #[test]
    fn detects_single_replace() {
        let a = seq("k=1\n");
        let b = seq("k=2\n");
        let blocks = diff(&a, &b);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(&blocks[0], Block::Replace { lines_a, lines_b, .. }
            if lines_a == &["k=1"] && lines_b == &["k=2"]));
    }

    #[test]
    fn blocks_reconstruct_both_sides() {
        let a = seq("1\n2\n3\n4\n");
        let b = seq("1\n2\nX\n4\n5\n");
        let blocks = diff(&a, &b);

        let mut reconstructed_a = Vec::new();
        let mut reconstructed_b = Vec::new();
        for block in &blocks {
            match block {
                Block::Insert { lines_b, .. } => reconstructed_b.extend(lines_b.clone()),
                Block::Delete { lines_a, .. } => reconstructed_a.extend(lines_a.clone()),
                Block::Replace { lines_a, lines_b, .. } => {
                    reconstructed_a.extend(lines_a.clone());
                    reconstructed_b.extend(lines_b.clone());
                },
                Block::Unchanged { len, pos_a, pos_b } => {
                    reconstructed_a.extend(a.lines()[*pos_a..pos_a + len].iter().cloned());
                    reconstructed_b.extend(b.lines()[*pos_b..pos_b + len].iter().cloned());
                },
            }
        }
        assert_eq!(reconstructed_a, a.lines());
        assert_eq!(reconstructed_b, b.lines());
    }

    #[test]
    fn count_changes_counts_replace_on_both_sides() {
        let a = seq("x\n");
        let b = seq("y\n");
        let blocks = diff(&a, &b);
        assert_eq!(count_changes(&blocks), (1, 1));
    }

    #[test]
    fn empty_sequences_diff_to_nothing() {
        let a = seq("");
        let b = seq("");
        assert!(diff(&a, &b).is_empty());
    }

    #[test]
    fn block_context_clamps_at_sequence_ends() {
        let a = seq("1\n2\n3\nX\n5\n");
        let b = seq("1\n2\n3\nY\n5\n");
        let blocks = diff(&a, &b);
        let change_idx = blocks.iter().position(|blk| !blk.is_unchanged()).unwrap();
        let ctx = block_context(&a, &b, &blocks, change_idx, 2);
        assert_eq!(ctx.before_a, vec!["2".to_string(), "3".to_string()]);
        assert_eq!(ctx.after_a, vec!["5".to_string()]);
    }
}
