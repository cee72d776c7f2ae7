//! Executes planned relocations and records each completed move.
//!
//! Same-volume moves rely on an atomic rename; a move that fails with a
//! cross-device error falls back to copy-verify-then-delete, for single files
//! and whole directory trees alike. One undo-log record is appended
//! immediately after each successful move and never before it, so a crash
//! mid-run can lose at most the record of the move in flight, never invent
//! one.

use crate::plan::PlannedRelocation;
use crate::undo_log::{self, LogError, LogRecord};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that abort the remainder of an execution batch.
///
/// Completed moves stand: they are already on disk and in the undo log, and
/// recovery is the operator's job via undo. `completed` counts the moves that
/// finished before the failure.
#[derive(Debug)]
pub enum ExecuteError {
    /// A move (or its parent-directory creation) failed.
    MoveFailed {
        source: PathBuf,
        destination: PathBuf,
        completed: usize,
        error: io::Error,
    },
    /// A move succeeded but its record could not be written.
    LogWriteFailed { completed: usize, error: LogError },
}

impl ExecuteError {
    /// Number of relocations that completed before the batch aborted.
    pub fn completed(&self) -> usize {
        match self {
            Self::MoveFailed { completed, .. } | Self::LogWriteFailed { completed, .. } => {
                *completed
            }
        }
    }
}

impl std::fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MoveFailed {
                source,
                destination,
                completed,
                error,
            } => write!(
                f,
                "Failed to move {} to {} ({} earlier relocations completed): {}",
                source.display(),
                destination.display(),
                completed,
                error
            ),
            Self::LogWriteFailed { completed, error } => write!(
                f,
                "Move succeeded but the undo record could not be written ({} relocations completed): {}",
                completed, error
            ),
        }
    }
}

impl std::error::Error for ExecuteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MoveFailed { error, .. } => Some(error),
            Self::LogWriteFailed { error, .. } => Some(error),
        }
    }
}

/// Executes a plan in order.
///
/// In dry-run mode every relocation is only reported through `on_move`;
/// nothing is mutated, no log record is written, and the returned count is
/// the number of *planned* relocations. In live mode each relocation creates
/// the destination's parent directories, moves the entry, appends one log
/// record, and then proceeds; the first failure aborts the remainder.
pub fn execute<F>(
    plan: &[PlannedRelocation],
    log_path: &Path,
    dry_run: bool,
    mut on_move: F,
) -> Result<usize, ExecuteError>
where
    F: FnMut(&PlannedRelocation),
{
    if dry_run {
        for relocation in plan {
            on_move(relocation);
        }
        return Ok(plan.len());
    }

    let mut completed = 0;
    for relocation in plan {
        on_move(relocation);

        let move_failed = |error: io::Error| ExecuteError::MoveFailed {
            source: relocation.source.clone(),
            destination: relocation.destination.clone(),
            completed,
            error,
        };

        if let Some(parent) = relocation.destination.parent() {
            fs::create_dir_all(parent).map_err(move_failed)?;
        }
        move_entry(&relocation.source, &relocation.destination).map_err(move_failed)?;

        let record = LogRecord::new(&relocation.destination, &relocation.source);
        undo_log::append(log_path, &record).map_err(|error| ExecuteError::LogWriteFailed {
            completed: completed + 1,
            error,
        })?;

        completed += 1;
    }

    Ok(completed)
}

/// Moves one entry, file or directory tree, from `source` to `destination`.
///
/// Rename keeps the move atomic on the same volume. Across volumes the
/// fallback copies first and deletes the source only once the copy is
/// verified, so a failure leaves the entry fully at the source.
pub fn move_entry(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_then_delete(source, destination)
        }
        Err(e) => Err(e),
    }
}

fn copy_then_delete(source: &Path, destination: &Path) -> io::Result<()> {
    if source.is_dir() {
        copy_dir_recursive(source, destination)?;
        fs::remove_dir_all(source)
    } else {
        let written = fs::copy(source, destination)?;
        let expected = fs::metadata(source)?.len();
        if written != expected {
            // Leave the source untouched; a partial destination must not
            // survive as if it were the real entry.
            let _ = fs::remove_file(destination);
            return Err(io::Error::other(format!(
                "incomplete copy of {}: {} of {} bytes",
                source.display(),
                written,
                expected
            )));
        }
        fs::remove_file(source)
    }
}

fn copy_dir_recursive(source: &Path, destination: &Path) -> io::Result<()> {
    fs::create_dir_all(destination)?;
    for child in fs::read_dir(source)? {
        let child = child?;
        let target = destination.join(child.file_name());
        if child.file_type()?.is_dir() {
            copy_dir_recursive(&child.path(), &target)?;
        } else {
            fs::copy(child.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Category;
    use tempfile::TempDir;

    fn relocation(source: PathBuf, destination: PathBuf) -> PlannedRelocation {
        PlannedRelocation {
            source,
            destination,
            category: Category::Misc,
        }
    }

    #[test]
    fn test_dry_run_reports_without_mutating() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("a.bin");
        fs::write(&src, "data").expect("write");
        let log = temp.path().join("undo.jsonl");

        let plan = vec![relocation(src.clone(), temp.path().join("Misc/a.bin"))];
        let mut reported = 0;
        let count = execute(&plan, &log, true, |_| reported += 1).expect("execute");

        assert_eq!(count, 1);
        assert_eq!(reported, 1);
        assert!(src.exists());
        assert!(!log.exists());
        assert!(!temp.path().join("Misc").exists());
    }

    #[test]
    fn test_live_run_moves_and_logs_in_order() {
        let temp = TempDir::new().expect("temp dir");
        let src_a = temp.path().join("a.bin");
        let src_b = temp.path().join("b.bin");
        fs::write(&src_a, "a").expect("write");
        fs::write(&src_b, "b").expect("write");
        let log = temp.path().join("undo.jsonl");

        let plan = vec![
            relocation(src_a.clone(), temp.path().join("Misc/a.bin")),
            relocation(src_b.clone(), temp.path().join("Misc/b.bin")),
        ];
        let count = execute(&plan, &log, false, |_| {}).expect("execute");

        assert_eq!(count, 2);
        assert!(!src_a.exists());
        assert!(temp.path().join("Misc/a.bin").exists());
        assert!(temp.path().join("Misc/b.bin").exists());

        let records = undo_log::load(&log).expect("load");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original, src_a);
        assert_eq!(records[1].original, src_b);
    }

    #[test]
    fn test_failure_aborts_remaining_and_keeps_completed() {
        let temp = TempDir::new().expect("temp dir");
        let src_a = temp.path().join("a.bin");
        fs::write(&src_a, "a").expect("write");
        let src_c = temp.path().join("c.bin");
        fs::write(&src_c, "c").expect("write");
        let log = temp.path().join("undo.jsonl");

        let plan = vec![
            relocation(src_a.clone(), temp.path().join("Misc/a.bin")),
            // Source vanished before execution.
            relocation(temp.path().join("b.bin"), temp.path().join("Misc/b.bin")),
            relocation(src_c.clone(), temp.path().join("Misc/c.bin")),
        ];

        let err = execute(&plan, &log, false, |_| {}).unwrap_err();
        assert_eq!(err.completed(), 1);
        assert!(matches!(err, ExecuteError::MoveFailed { .. }));

        // First move stands and is logged; third was never attempted.
        assert!(temp.path().join("Misc/a.bin").exists());
        assert!(src_c.exists());
        assert_eq!(undo_log::load(&log).expect("load").len(), 1);
    }

    #[test]
    fn test_move_entry_moves_directory_tree() {
        let temp = TempDir::new().expect("temp dir");
        let project = temp.path().join("myapp");
        fs::create_dir_all(project.join("src")).expect("mkdir");
        fs::write(project.join("src/main.rs"), "fn main() {}").expect("write");

        let dst = temp.path().join("code/myapp");
        fs::create_dir_all(dst.parent().unwrap()).expect("mkdir");
        move_entry(&project, &dst).expect("move");

        assert!(!project.exists());
        assert!(dst.join("src/main.rs").exists());
    }

    #[test]
    fn test_copy_then_delete_roundtrips_content() {
        let temp = TempDir::new().expect("temp dir");
        let src = temp.path().join("payload.bin");
        fs::write(&src, b"payload bytes").expect("write");
        let dst = temp.path().join("moved.bin");

        copy_then_delete(&src, &dst).expect("copy");
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).expect("read"), b"payload bytes");
    }
}
