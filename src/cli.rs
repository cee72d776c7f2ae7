//! Command-line surface: argument parsing, source scanning, and run
//! orchestration.
//!
//! This layer resolves arguments and configuration into a [`RunOptions`],
//! lists the source folders, and drives the core planning/execution/undo
//! modules. The core never reads arguments or the environment itself.

use crate::config::{self, AppConfig, CompiledFilters};
use crate::mover::{self, ExecuteError};
use crate::output::OutputFormatter;
use crate::plan::{self, DestinationRoots};
use crate::rules::{Entry, EntryKind, RuleTable};
use crate::undo::{self, UndoError};
use clap::Parser;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Tidy loose files and project folders out of Downloads and Desktop.
#[derive(Debug, Parser)]
#[command(name = "tidydesk", version, about)]
pub struct Cli {
    /// Source folders to scan (default: ~/Downloads and ~/Desktop).
    #[arg(long, num_args = 1.., value_name = "DIR")]
    pub sources: Vec<PathBuf>,

    /// Destination for code files and project folders.
    #[arg(long, value_name = "DIR")]
    pub code_root: Option<PathBuf>,

    /// Base folder for the non-code categories (Documents, Media, Archives,
    /// Apps, Misc).
    #[arg(long, value_name = "DIR")]
    pub organized_root: Option<PathBuf>,

    /// Undo log location.
    #[arg(long, value_name = "FILE")]
    pub undo_log: Option<PathBuf>,

    /// Preview the run without changing any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Revert the moves recorded in the undo log instead of organizing.
    #[arg(long)]
    pub undo: bool,

    /// Explicit configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Fully resolved inputs for one run. Command-line values override the
/// configuration file, which overrides the built-in defaults.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub sources: Vec<PathBuf>,
    pub code_root: PathBuf,
    pub organized_root: PathBuf,
    pub undo_log: PathBuf,
    pub dry_run: bool,
}

impl RunOptions {
    pub fn resolve(cli: &Cli, config: &AppConfig) -> Self {
        let sources = if cli.sources.is_empty() {
            config
                .paths
                .sources
                .iter()
                .map(|s| config::expand_tilde(s))
                .collect()
        } else {
            cli.sources.clone()
        };

        let pick = |flag: &Option<PathBuf>, fallback: &str| {
            flag.clone()
                .unwrap_or_else(|| config::expand_tilde(fallback))
        };

        Self {
            sources,
            code_root: pick(&cli.code_root, &config.paths.code_root),
            organized_root: pick(&cli.organized_root, &config.paths.organized_root),
            undo_log: pick(&cli.undo_log, &config.paths.undo_log),
            dry_run: cli.dry_run,
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Relocations performed, or planned in dry-run mode. For undo runs,
    /// entries restored.
    pub performed: usize,
    /// Entries skipped with a reported reason.
    pub skipped: usize,
    pub dry_run: bool,
}

/// Entry point used by the binary.
pub fn run(cli: &Cli) -> Result<(), String> {
    let config = AppConfig::load(cli.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .filters
        .clone()
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))?;
    let opts = RunOptions::resolve(cli, &config);

    if cli.undo {
        undo_run(&opts.undo_log, opts.dry_run).map(|_| ())
    } else {
        organize(&opts, &filters).map(|_| ())
    }
}

/// Lists the immediate children of every source folder, in a stable order.
///
/// Missing or non-directory sources are noted and skipped. Hidden and
/// filtered names never reach classification. Within each source, entries
/// are sorted by name so repeated runs see the same discovery order; sources
/// keep the order they were given in.
pub fn collect_entries(sources: &[PathBuf], filters: &CompiledFilters) -> Vec<Entry> {
    let mut entries = Vec::new();

    for source in sources {
        if !source.is_dir() {
            OutputFormatter::info(&format!(
                "Skipping missing source folder: {}",
                source.display()
            ));
            continue;
        }
        let listing = match fs::read_dir(source) {
            Ok(listing) => listing,
            Err(e) => {
                OutputFormatter::warning(&format!(
                    "Cannot read source folder {}: {}",
                    source.display(),
                    e
                ));
                continue;
            }
        };

        let mut batch = Vec::new();
        for item in listing.flatten() {
            let path = item.path();
            if !filters.should_include(&path) {
                continue;
            }
            let Ok(file_type) = item.file_type() else {
                continue;
            };
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            batch.push(Entry::new(path, kind));
        }
        batch.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        entries.extend(batch);
    }

    entries
}

/// Scans, plans, and executes one organize run.
pub fn organize(opts: &RunOptions, filters: &CompiledFilters) -> Result<RunSummary, String> {
    OutputFormatter::info(&format!(
        "Run at: {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S")
    ));
    if opts.dry_run {
        OutputFormatter::dry_run_notice("Previewing moves; no files will be changed.");
    }

    let rules = RuleTable::new();
    let roots = DestinationRoots::new(opts.code_root.clone(), opts.organized_root.clone());
    let entries = collect_entries(&opts.sources, filters);
    let staged = plan::stage(&entries, &rules, &roots);

    for skip in &staged.skipped {
        OutputFormatter::warning(&format!("SKIP {}: {}", skip.path.display(), skip.reason));
    }

    let mut summary = RunSummary {
        performed: 0,
        skipped: staged.skipped.len(),
        dry_run: opts.dry_run,
    };

    if staged.planned.is_empty() {
        OutputFormatter::info("No matching files found. Nothing to organize.");
        return Ok(summary);
    }

    let bar = if opts.dry_run {
        None
    } else {
        Some(OutputFormatter::create_progress_bar(
            staged.planned.len() as u64
        ))
    };

    let outcome = mover::execute(&staged.planned, &opts.undo_log, opts.dry_run, |relocation| {
        match &bar {
            Some(pb) => {
                pb.println(format!(
                    "MOVE: {} -> {}",
                    relocation.source.display(),
                    relocation.destination.display()
                ));
                pb.inc(1);
            }
            None => OutputFormatter::relocation_line(
                &relocation.source,
                &relocation.destination,
                true,
            ),
        }
    });
    if let Some(pb) = &bar {
        pb.finish_and_clear();
    }

    match outcome {
        Ok(count) => {
            summary.performed = count;

            let mut counts: HashMap<&'static str, usize> = HashMap::new();
            for relocation in &staged.planned {
                *counts.entry(relocation.category.dir_name()).or_insert(0) += 1;
            }
            OutputFormatter::summary_table(&counts, count);

            if opts.dry_run {
                OutputFormatter::success(&format!("Planned {} moves (dry run).", count));
                OutputFormatter::info("Run again without --dry-run to execute them.");
            } else {
                OutputFormatter::success(&format!("Completed {} moves.", count));
                OutputFormatter::info("Run 'tidydesk --undo' to revert them.");
            }
            Ok(summary)
        }
        Err(error @ ExecuteError::MoveFailed { .. }) => {
            summary.performed = error.completed();
            let remaining = staged.planned.len() - error.completed();
            OutputFormatter::error(&error.to_string());
            OutputFormatter::warning(&format!(
                "Aborted with {} moves completed and {} remaining. \
                 Completed moves are in the undo log.",
                error.completed(),
                remaining
            ));
            Ok(summary)
        }
        Err(error @ ExecuteError::LogWriteFailed { .. }) => Err(error.to_string()),
    }
}

/// Replays the undo log and reports the outcome.
pub fn undo_run(log_path: &Path, dry_run: bool) -> Result<RunSummary, String> {
    if dry_run {
        OutputFormatter::dry_run_notice("Previewing undo; no files will be changed.");
    }

    match undo::undo(log_path, dry_run, |record| {
        OutputFormatter::restore_line(&record.moved_to, &record.original, dry_run);
    }) {
        Ok(report) => {
            if report.total() == 0 {
                OutputFormatter::info(&format!(
                    "Undo log {} is empty or missing; nothing to revert.",
                    log_path.display()
                ));
            } else if dry_run {
                OutputFormatter::success(&format!(
                    "Would restore {} entries (dry run).",
                    report.restored
                ));
            } else {
                OutputFormatter::success(&format!("Restored {} entries.", report.restored));
                for (path, reason) in &report.skipped {
                    OutputFormatter::warning(&format!(
                        "Skipped {}: {}",
                        path.display(),
                        reason
                    ));
                }
            }
            Ok(RunSummary {
                performed: report.restored,
                skipped: report.skipped.len(),
                dry_run,
            })
        }
        Err(error @ UndoError::RestoreFailed { .. }) => {
            let restored = match &error {
                UndoError::RestoreFailed { restored, .. } => *restored,
                UndoError::Log(_) => 0,
            };
            OutputFormatter::error(&error.to_string());
            OutputFormatter::warning(
                "The undo log was preserved; run undo again once the problem is resolved.",
            );
            Ok(RunSummary {
                performed: restored,
                skipped: 0,
                dry_run,
            })
        }
        Err(error @ UndoError::Log(_)) => Err(error.to_string()),
    }
}
