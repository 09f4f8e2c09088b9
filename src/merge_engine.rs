//! Block-by-block reconciliation of two [`LineSeq`]s into one, driven by a
//! caller-supplied choice function.
//!
//! Grounded on the teacher's `SyncOptions` plain-struct-of-flags pattern
//! (`core.rs::SyncOptions`) for [`MergeStrategy`]; the block-loop procedure
//! itself has no teacher analogue (the teacher never merges file content,
//! only whole-file copy/replace) and is built directly from the block
//! vocabulary in [`crate::differ`].

use crate::differ::{block_context, diff, Block, BlockContext, DEFAULT_CONTEXT};
use crate::line_seq::LineSeq;

/// A caller's decision for one non-`Unchanged` block. Which variants are
/// legal depends on the block kind; see the table on [`merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockChoice {
    /// Insert: take `lines_b`.
    Include,
    /// Insert/Replace: take nothing.
    Skip,
    /// Delete: take `lines_a`.
    Keep,
    /// Delete: take nothing.
    Remove,
    /// Replace: take `lines_a`.
    UseA,
    /// Replace: take `lines_b`.
    UseB,
    /// Replace: take `lines_a` followed by `lines_b`.
    UseBoth,
    /// Abort the merge entirely. Legal for any block kind.
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub merged: LineSeq,
    pub cancelled: bool,
}

impl MergeResult {
    fn cancelled() -> Self {
        Self { merged: LineSeq::default(), cancelled: true }
    }
}

/// Whole-file fast path alongside the piecewise block loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    TakeA,
    TakeB,
    Cancel,
    Piecewise,
}

/// Walk `diff(a, b)` in order, auto-copying `Unchanged` blocks and invoking
/// `choose(block, context, index)` for everything else.
///
/// | Block kind | Legal choices                | Output lines appended               |
/// |------------|-------------------------------|--------------------------------------|
/// | Insert     | `Include` / `Skip`             | `lines_b` / ∅                        |
/// | Delete     | `Keep` / `Remove`              | `lines_a` / ∅                        |
/// | Replace    | `UseA` / `UseB` / `UseBoth` / `Skip` | `lines_a` / `lines_b` / `lines_a`+`lines_b` / ∅ |
///
/// `Cancel` is legal on any block and short-circuits with
/// `{cancelled: true}` and an empty merged sequence.
///
/// Invariants: choosing the "identity" option (`Keep`, `Skip`-on-`Insert`)
/// throughout reproduces `a`; choosing the "adopt-b" option (`Remove`,
/// `Include`, `UseB`) throughout reproduces `b`; `merge(a, a, _)` reproduces
/// `a` regardless of `choose` since an identical pair diffs to all
/// `Unchanged` blocks and `choose` is never called.
pub fn merge(
    a: &LineSeq,
    b: &LineSeq,
    mut choose: impl FnMut(&Block, &BlockContext, usize) -> BlockChoice,
) -> MergeResult {
    let blocks = diff(a, b);
    let mut out = Vec::new();

    for (i, block) in blocks.iter().enumerate() {
        match block {
            Block::Unchanged { len, pos_a, .. } => {
                out.extend(a.lines()[*pos_a..pos_a + len].iter().cloned());
            },
            _ => {
                let context = block_context(a, b, &blocks, i, DEFAULT_CONTEXT);
                let choice = choose(block, &context, i);
                if choice == BlockChoice::Cancel {
                    return MergeResult::cancelled();
                }
                append_choice(block, choice, &mut out);
            },
        }
    }

    let (had_crlf, trailing_newline) = LineSeq::combine_flags(a, b);
    MergeResult { merged: LineSeq::new(out, had_crlf, trailing_newline), cancelled: false }
}

fn append_choice(block: &Block, choice: BlockChoice, out: &mut Vec<String>) {
    match (block, choice) {
        (Block::Insert { lines_b, .. }, BlockChoice::Include) => out.extend(lines_b.iter().cloned()),
        (Block::Insert { .. }, BlockChoice::Skip) => {},
        (Block::Delete { lines_a, .. }, BlockChoice::Keep) => out.extend(lines_a.iter().cloned()),
        (Block::Delete { .. }, BlockChoice::Remove) => {},
        (Block::Replace { lines_a, .. }, BlockChoice::UseA) => out.extend(lines_a.iter().cloned()),
        (Block::Replace { lines_b, .. }, BlockChoice::UseB) => out.extend(lines_b.iter().cloned()),
        (Block::Replace { lines_a, lines_b, .. }, BlockChoice::UseBoth) => {
            out.extend(lines_a.iter().cloned());
            out.extend(lines_b.iter().cloned());
        },
        (Block::Replace { .. }, BlockChoice::Skip) => {},
        (kind, choice) => unreachable!("illegal choice {choice:?} for block kind {kind:?}"),
    }
}

/// `TakeA`/`TakeB` skip diffing entirely; `Cancel` short-circuits; `Piecewise`
/// falls through to [`merge`].
pub fn merge_whole(
    a: &LineSeq,
    b: &LineSeq,
    strategy: MergeStrategy,
    choose: impl FnMut(&Block, &BlockContext, usize) -> BlockChoice,
) -> MergeResult {
    match strategy {
        MergeStrategy::TakeA => MergeResult { merged: a.clone(), cancelled: false },
        MergeStrategy::TakeB => MergeResult { merged: b.clone(), cancelled: false },
        MergeStrategy::Cancel => MergeResult::cancelled(),
        MergeStrategy::Piecewise => merge(a, b, choose),
    }
}

/// Choice function mapping every block to its "identity" (keep-`a`) option.
pub fn identity_choice(block: &Block, _ctx: &BlockContext, _idx: usize) -> BlockChoice {
    match block {
        Block::Insert { .. } => BlockChoice::Skip,
        Block::Delete { .. } => BlockChoice::Keep,
        Block::Replace { .. } => BlockChoice::UseA,
        Block::Unchanged { .. } => unreachable!("choose is never called for Unchanged blocks"),
    }
}

/// Choice function mapping every block to its "adopt b" option.
pub fn adopt_b_choice(block: &Block, _ctx: &BlockContext, _idx: usize) -> BlockChoice {
    match block {
        Block::Insert { .. } => BlockChoice::Include,
        Block::Delete { .. } => BlockChoice::Remove,
        Block::Replace { .. } => BlockChoice::UseB,
        Block::Unchanged { .. } => unreachable!("choose is never called for Unchanged blocks"),
    }
}
