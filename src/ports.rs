//! Polymorphic capabilities the core calls out to, decoupling
//! [`crate::orchestrator`] from any concrete UI.
//!
//! Console implementations are grounded on the teacher's `main.rs`
//! `print!("Proceed? [y/N] ")` confirmation idiom; batch implementations are
//! the non-interactive defaults [`crate::batch`] drives multi-pattern runs
//! with.

use crate::differ::{Block, BlockContext};
use crate::line_seq::LineSeq;
use crate::merge_engine::{self, merge, BlockChoice, MergeResult, MergeStrategy};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Fire-and-forget notifications the core pushes out during a run.
#[derive(Debug, Clone)]
pub enum StatusEvent {
    /// One step of the iterative merge, reported for progress display.
    Progress { iteration: usize, left: String, right: String, score: f64 },
    /// Two paths hashed identically but a byte-compare found them different;
    /// the grouper split them into separate groups rather than trusting the
    /// hash.
    Collision { first: PathBuf, second: PathBuf },
}

/// Merges `left` and `right`, optionally seeded with `existing` content from
/// a prior manual edit (ports that don't support resuming ignore it).
pub trait MergePort: Send + Sync {
    fn merge(&self, left: &LineSeq, right: &LineSeq, existing: Option<&LineSeq>) -> MergeResult;
}

/// Fire-and-forget progress reporting.
pub trait StatusPort: Send + Sync {
    fn status(&self, event: &StatusEvent);
}

/// Gate between iterations. May be hard-wired to `true` in batch mode.
pub trait ContinuePort: Send + Sync {
    fn should_continue(&self) -> bool;
}

/// The [`MergePort`]'s inner hook: decide one block's fate.
pub trait BlockChoicePort: Send + Sync {
    fn choose(&self, block: &Block, context: &BlockContext, idx: usize) -> BlockChoice;
}

/// Interactive console prompt, one question per non-`Unchanged` block.
pub struct ConsoleBlockChoicePort;

impl BlockChoicePort for ConsoleBlockChoicePort {
    fn choose(&self, block: &Block, _context: &BlockContext, _idx: usize) -> BlockChoice {
        let (prompt, options): (&str, &[(&str, BlockChoice)]) = match block {
            Block::Insert { lines_b, .. } => {
                print_side("+", lines_b);
                ("Include [i] / Skip [s] / Cancel [c]", &[
                    ("i", BlockChoice::Include),
                    ("s", BlockChoice::Skip),
                    ("c", BlockChoice::Cancel),
                ])
            },
            Block::Delete { lines_a, .. } => {
                print_side("-", lines_a);
                ("Keep [k] / Remove [r] / Cancel [c]", &[
                    ("k", BlockChoice::Keep),
                    ("r", BlockChoice::Remove),
                    ("c", BlockChoice::Cancel),
                ])
            },
            Block::Replace { lines_a, lines_b, .. } => {
                print_side("-", lines_a);
                print_side("+", lines_b);
                ("Use A [a] / Use B [b] / Use both [o] / Skip [s] / Cancel [c]", &[
                    ("a", BlockChoice::UseA),
                    ("b", BlockChoice::UseB),
                    ("o", BlockChoice::UseBoth),
                    ("s", BlockChoice::Skip),
                    ("c", BlockChoice::Cancel),
                ])
            },
            Block::Unchanged { .. } => unreachable!("choose is never called for Unchanged blocks"),
        };

        loop {
            print!("{prompt} ");
            let _ = io::stdout().flush();
            let mut input = String::new();
            if io::stdin().read_line(&mut input).is_err() {
                return BlockChoice::Cancel;
            }
            let trimmed = input.trim();
            if let Some((_, choice)) = options.iter().find(|(key, _)| *key == trimmed) {
                return *choice;
            }
        }
    }
}

fn print_side(marker: &str, lines: &[String]) {
    for line in lines {
        if marker == "+" {
            println!("{} {line}", marker.green());
        } else {
            println!("{} {line}", marker.red());
        }
    }
}

/// Drives [`merge_engine::merge`] with a [`BlockChoicePort`].
pub struct ConsoleMergePort {
    pub chooser: Box<dyn BlockChoicePort>,
}

impl MergePort for ConsoleMergePort {
    fn merge(&self, left: &LineSeq, right: &LineSeq, _existing: Option<&LineSeq>) -> MergeResult {
        merge(left, right, |block, ctx, idx| self.chooser.choose(block, ctx, idx))
    }
}

/// `println!` progress with `owo-colors` styling, grounded on the teacher's
/// `"Scanning: {path}"` / `"Done."` progress lines.
pub struct ConsoleStatusPort;

impl StatusPort for ConsoleStatusPort {
    fn status(&self, event: &StatusEvent) {
        match event {
            StatusEvent::Progress { iteration, left, right, score } => {
                println!(
                    "{} {} {} {} {} ({:.0}% similar)",
                    format!("[{iteration}]").bold(),
                    left,
                    "<->".dimmed(),
                    right,
                    "merging".cyan(),
                    score * 100.0
                );
            },
            StatusEvent::Collision { first, second } => {
                println!(
                    "{} hash collision between {} and {}, split into separate versions",
                    "warning:".yellow().bold(),
                    first.display(),
                    second.display()
                );
            },
        }
    }
}

/// Prompts `Continue? [Y/n]`, defaulting to yes on empty input.
pub struct ConsoleContinuePort;

impl ContinuePort for ConsoleContinuePort {
    fn should_continue(&self) -> bool {
        print!("Continue? [Y/n] ");
        let _ = io::stdout().flush();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        let trimmed = input.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case("y")
    }
}

/// Non-interactive merge port for unattended batch runs: takes a fixed
/// whole-file [`MergeStrategy`] (default "adopt B", i.e. later pattern
/// matches win).
pub struct BatchMergePort {
    pub strategy: MergeStrategy,
}

impl Default for BatchMergePort {
    fn default() -> Self {
        Self { strategy: MergeStrategy::TakeB }
    }
}

impl MergePort for BatchMergePort {
    fn merge(&self, left: &LineSeq, right: &LineSeq, _existing: Option<&LineSeq>) -> MergeResult {
        merge_engine::merge_whole(left, right, self.strategy, merge_engine::adopt_b_choice)
    }
}

/// Silent status sink for non-interactive runs; [`crate::batch`] wraps this
/// to forward events into its own phase-banner progress channel instead.
pub struct NullStatusPort;

impl StatusPort for NullStatusPort {
    fn status(&self, _event: &StatusEvent) {}
}

/// Always continues; batch mode never waits on interactive confirmation
/// between iterations.
pub struct AlwaysContinuePort;

impl ContinuePort for AlwaysContinuePort {
    fn should_continue(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_merge_port_adopts_b_by_default() {
        let port = BatchMergePort::default();
        let a = LineSeq::from_text("1\n2\n");
        let b = LineSeq::from_text("1\nX\n");
        let result = port.merge(&a, &b, None);
        assert_eq!(result.merged.lines(), b.lines());
    }

    #[test]
    fn always_continue_port_is_always_true() {
        assert!(AlwaysContinuePort.should_continue());
    }

    #[test]
    fn null_status_port_accepts_any_event() {
        NullStatusPort.status(&StatusEvent::Progress {
            iteration: 1,
            left: "a".into(),
            right: "b".into(),
            score: 0.5,
        });
        NullStatusPort.status(&StatusEvent::Collision { first: "a".into(), second: "b".into() });
    }
}
