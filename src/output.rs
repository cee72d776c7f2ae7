//! Console output styling.
//!
//! All user-facing printing goes through here: colored status lines, per-move
//! and per-restore reports, a progress bar for live runs, and the end-of-run
//! category summary. The core modules never print; they report through
//! callbacks that the CLI layer wires to these helpers.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;

/// Manages all CLI output with consistent styling.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Per-relocation and per-restore report lines
/// - A progress bar for live execution
/// - The end-of-run category summary table
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// OutputFormatter::success("Completed 4 moves.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, to stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// OutputFormatter::error("Failed to move entry");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a bold section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints one line for a planned or executed relocation.
    ///
    /// # Arguments
    ///
    /// * `source` - Where the entry currently lives
    /// * `destination` - Where it is (or would be) moved
    /// * `dry_run` - Whether this is a preview line
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// use std::path::Path;
    ///
    /// OutputFormatter::relocation_line(
    ///     Path::new("/home/user/Downloads/notes.pdf"),
    ///     Path::new("/home/user/Workspace/Organized/Documents/notes.pdf"),
    ///     true,
    /// );
    /// ```
    pub fn relocation_line(source: &Path, destination: &Path, dry_run: bool) {
        let verb = if dry_run {
            "WOULD MOVE".yellow()
        } else {
            "MOVE".green()
        };
        println!(
            "{}: {} {} {}",
            verb,
            source.display(),
            "->".dimmed(),
            destination.display()
        );
    }

    /// Prints one line for a reversal during undo.
    ///
    /// # Arguments
    ///
    /// * `destination` - The logged destination being moved back
    /// * `original` - The original path being restored
    /// * `dry_run` - Whether this is a preview line
    pub fn restore_line(destination: &Path, original: &Path, dry_run: bool) {
        let verb = if dry_run {
            "WOULD RESTORE".yellow()
        } else {
            "RESTORE".green()
        };
        println!(
            "{}: {} {} {}",
            verb,
            destination.display(),
            "->".dimmed(),
            original.display()
        );
    }

    /// Creates a progress bar for live execution.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of relocations to execute
    ///
    /// # Returns
    ///
    /// A configured `ProgressBar` ready for use.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(12);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints the category-by-count summary for an organize run.
    ///
    /// # Arguments
    ///
    /// * `category_counts` - Map of category labels to relocation counts
    /// * `total` - Total number of relocations performed or planned
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tidydesk::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("Documents", 3);
    /// counts.insert("Code", 1);
    /// OutputFormatter::summary_table(&counts, 4);
    /// ```
    pub fn summary_table(category_counts: &HashMap<&'static str, usize>, total: usize) {
        Self::header("SUMMARY");

        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| *name);

        let width = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!("{:<width$} | {}", "Category".bold(), "Entries".bold());
        println!("{}", "-".repeat(width + 10));
        for (category, count) in &categories {
            println!(
                "{:<width$} | {}",
                category,
                count.to_string().green(),
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            total.to_string().green().bold(),
        );
    }

    /// Prints a yellow banner for dry-run notices.
    ///
    /// # Arguments
    ///
    /// * `message` - The dry-run message
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}
