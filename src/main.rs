use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use blastmerge::{
    config::{read_batches, BatchConfig, JsonFileStore},
    finder,
    fs_port::{FsPort, RealFs},
    grouper::{self, VersionSet},
    orchestrator::{self, SessionOutcome},
    ports::{
        BatchMergePort, ConsoleBlockChoicePort, ConsoleContinuePort, ConsoleMergePort, ConsoleStatusPort,
        AlwaysContinuePort, NullStatusPort,
    },
};

#[derive(Parser)]
#[command(name = "blastmerge", version, about = "Unify divergent copies of a file into one agreed version")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find every file matching a name or glob under a root, and unify them
    /// if they've diverged.
    Find {
        /// Directory to search
        root: PathBuf,

        /// Exact basename or glob (e.g. "*.toml") to match
        pattern: String,

        /// Exclude files matching glob patterns (can be used multiple times)
        #[arg(short, long, value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Resolve non-interactively (take the newer-looking version at
        /// each step rather than prompting per block)
        #[arg(short, long)]
        yes: bool,

        /// Quiet mode (no progress)
        #[arg(short, long)]
        quiet: bool,
    },
    /// Run a saved batch of patterns by name.
    Batch {
        /// Name of a previously saved batch configuration
        name: String,

        /// Quiet mode (no progress)
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e:#}", "Error:".red());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Find { root, pattern, exclude, yes, quiet } => run_find(root, pattern, exclude, yes, quiet),
        Command::Batch { name, quiet } => run_batch(name, quiet),
    }
}

fn run_find(root: PathBuf, pattern: String, exclude: Vec<String>, yes: bool, quiet: bool) -> Result<()> {
    if !root.exists() {
        bail!("Root does not exist: {}", root.display());
    }

    if !quiet {
        println!("Searching: {} for {}", root.display(), pattern);
    }

    let files = finder::find(&root, &pattern, &exclude)
        .with_context(|| format!("searching {} for {pattern}", root.display()))?;

    if files.is_empty() {
        if !quiet {
            println!("No files matched");
        }
        return Ok(());
    }

    let fs_port = RealFs::new();
    let version_set = grouper::group_with_status(&files, &ConsoleStatusPort);
    report_and_resolve(&fs_port, &version_set, yes, quiet)
}

fn run_batch(name: String, quiet: bool) -> Result<()> {
    let config_path = JsonFileStore::default_location()
        .context("could not determine a config directory for this platform")?;
    let store = JsonFileStore::new(config_path);
    let batches = read_batches(&store).context("reading saved batches")?;
    let batch = find_batch(&batches, &name)?;

    let fs_port = RealFs::new();
    let merge_port = BatchMergePort::default();
    let status_port = NullStatusPort;
    let continue_port = AlwaysContinuePort;

    let start = Instant::now();
    let result = blastmerge::run_batch(&fs_port, &batch, &merge_port, &status_port, &continue_port, |banner| {
        if !quiet {
            println!("{}", banner.bold());
        }
    })
    .with_context(|| format!("running batch '{name}'"))?;

    if !quiet {
        for pattern_result in &result.per_pattern {
            let marker = if pattern_result.success { "" } else { "FAILED: " };
            println!("{}: {marker}{}", pattern_result.pattern, pattern_result.message);
        }
        println!("{} in {:.2}s", "Done".green().bold(), start.elapsed().as_secs_f64());
    }

    let failed = result.per_pattern.iter().filter(|r| !r.success).count();
    if failed > 0 {
        bail!("{failed} pattern(s) failed to resolve cleanly");
    }

    Ok(())
}

fn find_batch(batches: &[BatchConfig], name: &str) -> Result<BatchConfig> {
    batches
        .iter()
        .find(|b| b.name == name)
        .cloned()
        .with_context(|| format!("no saved batch named '{name}'"))
}

fn report_and_resolve(fs_port: &dyn FsPort, version_set: &VersionSet, yes: bool, quiet: bool) -> Result<()> {
    if version_set.len() < 2 {
        if !quiet {
            println!("{}", "Already identical".green());
        }
        return Ok(());
    }

    if !quiet {
        let total: usize = version_set.iter().map(|g| g.paths.len()).sum();
        println!("{total} files, {} distinct versions", version_set.len());
    }

    let start = Instant::now();
    let outcome = if yes {
        orchestrator::run_iterative(
            fs_port,
            version_set,
            &BatchMergePort::default(),
            &ConsoleStatusPort,
            &AlwaysContinuePort,
        )
    } else {
        let merge_port = ConsoleMergePort { chooser: Box::new(ConsoleBlockChoicePort) };
        orchestrator::run_iterative(fs_port, version_set, &merge_port, &ConsoleStatusPort, &ConsoleContinuePort)
    };

    match outcome {
        SessionOutcome::Done { write_results, .. } => {
            let failed: Vec<_> = write_results.iter().filter(|(_, r)| r.is_err()).collect();
            if !quiet {
                println!(
                    "{} {} files written in {:.2}s",
                    "Done.".green().bold(),
                    write_results.len() - failed.len(),
                    start.elapsed().as_secs_f64()
                );
            }
            if !failed.is_empty() {
                bail!("{} file(s) failed to write", failed.len());
            }
            Ok(())
        },
        SessionOutcome::Cancelled => {
            if !quiet {
                println!("Cancelled, no files written");
            }
            Ok(())
        },
    }
}
