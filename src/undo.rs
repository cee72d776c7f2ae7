//! Reverses recorded relocations by replaying the undo log backwards.
//!
//! The log is replayed most-recent-first: later relocations may have produced
//! numbered collision siblings whose originals must be restored before the
//! earlier, differently-named relocations are reversed. Undo is best-effort
//! for entries the user has since moved or deleted, but all-or-nothing with
//! respect to the log file itself — it is deleted only when the whole replay
//! finishes without a restore failure.

use crate::mover;
use crate::undo_log::{self, LogError, LogRecord};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of an undo invocation.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Entries moved back to their original paths (or that would be, in
    /// dry-run mode).
    pub restored: usize,
    /// Logged destinations that no longer existed, with the reason noted.
    pub skipped: Vec<(PathBuf, String)>,
}

impl UndoReport {
    /// Total records processed.
    pub fn total(&self) -> usize {
        self.restored + self.skipped.len()
    }
}

/// Errors that stop an undo run.
#[derive(Debug)]
pub enum UndoError {
    /// The log could not be read, parsed, or deleted.
    Log(LogError),
    /// A restore move failed; the log is left intact so a retry can resume.
    RestoreFailed {
        destination: PathBuf,
        original: PathBuf,
        restored: usize,
        error: io::Error,
    },
}

impl From<LogError> for UndoError {
    fn from(error: LogError) -> Self {
        Self::Log(error)
    }
}

impl std::fmt::Display for UndoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Log(error) => write!(f, "{}", error),
            Self::RestoreFailed {
                destination,
                original,
                restored,
                error,
            } => write!(
                f,
                "Failed to restore {} to {} ({} entries already restored): {}",
                destination.display(),
                original.display(),
                restored,
                error
            ),
        }
    }
}

impl std::error::Error for UndoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Log(error) => Some(error),
            Self::RestoreFailed { error, .. } => Some(error),
        }
    }
}

/// Replays the entire undo log in reverse order.
///
/// An absent or empty log yields a zero-operation report. Each record whose
/// destination still exists is moved back to its original path, creating the
/// original's parent directories if needed; records whose destination is gone
/// are counted as informational skips. Dry-run mode reports every reversal
/// through `on_restore` without touching the filesystem or the log. On full
/// live success the log file is deleted — benign skips do not prevent
/// deletion, a restore failure does.
pub fn undo<F>(log_path: &Path, dry_run: bool, mut on_restore: F) -> Result<UndoReport, UndoError>
where
    F: FnMut(&LogRecord),
{
    let records = undo_log::load(log_path)?;
    let mut report = UndoReport::default();
    if records.is_empty() {
        return Ok(report);
    }

    for record in records.iter().rev() {
        on_restore(record);

        if dry_run {
            report.restored += 1;
            continue;
        }

        if !record.moved_to.exists() {
            report.skipped.push((
                record.moved_to.clone(),
                "no longer at the logged destination".to_string(),
            ));
            continue;
        }

        restore(record).map_err(|error| UndoError::RestoreFailed {
            destination: record.moved_to.clone(),
            original: record.original.clone(),
            restored: report.restored,
            error,
        })?;
        report.restored += 1;
    }

    if !dry_run {
        undo_log::delete(log_path)?;
    }
    Ok(report)
}

fn restore(record: &LogRecord) -> io::Result<()> {
    if let Some(parent) = record.original.parent() {
        fs::create_dir_all(parent)?;
    }
    mover::move_entry(&record.moved_to, &record.original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record_move(temp: &TempDir, log: &Path, name: &str) -> (PathBuf, PathBuf) {
        let original = temp.path().join("downloads").join(name);
        let moved_to = temp.path().join("organized/Misc").join(name);
        fs::create_dir_all(moved_to.parent().unwrap()).expect("mkdir");
        fs::create_dir_all(original.parent().unwrap()).expect("mkdir");
        fs::write(&moved_to, name).expect("write");
        undo_log::append(log, &LogRecord::new(&moved_to, &original)).expect("append");
        (original, moved_to)
    }

    #[test]
    fn test_undo_absent_log_reports_zero() {
        let temp = TempDir::new().expect("temp dir");
        let report = undo(&temp.path().join("missing.jsonl"), false, |_| {}).expect("undo");
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_undo_restores_in_reverse_order_and_deletes_log() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");
        let (orig_a, moved_a) = record_move(&temp, &log, "a.txt");
        let (orig_b, moved_b) = record_move(&temp, &log, "b.txt");

        let mut order = Vec::new();
        let report = undo(&log, false, |r| order.push(r.moved_to.clone())).expect("undo");

        assert_eq!(report.restored, 2);
        assert_eq!(order, vec![moved_b.clone(), moved_a.clone()]);
        assert!(orig_a.exists() && orig_b.exists());
        assert!(!moved_a.exists() && !moved_b.exists());
        assert!(!log.exists());
    }

    #[test]
    fn test_undo_skips_missing_destination_and_still_deletes_log() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");
        let (orig_a, _) = record_move(&temp, &log, "a.txt");
        let (orig_b, moved_b) = record_move(&temp, &log, "b.txt");
        fs::remove_file(&moved_b).expect("simulate user deletion");

        let report = undo(&log, false, |_| {}).expect("undo");

        assert_eq!(report.restored, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, moved_b);
        assert!(orig_a.exists());
        assert!(!orig_b.exists());
        assert!(!log.exists(), "benign skips must not preserve the log");
    }

    #[test]
    fn test_undo_dry_run_touches_nothing() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");
        let (orig, moved) = record_move(&temp, &log, "a.txt");

        let report = undo(&log, true, |_| {}).expect("undo");

        assert_eq!(report.restored, 1);
        assert!(moved.exists());
        assert!(!orig.exists());
        assert!(log.exists());
    }

    #[test]
    fn test_undo_restore_failure_preserves_log_and_entry() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");

        // A file occupies the original's parent path, so the restore cannot
        // create the parent directory.
        let original = temp.path().join("blocked").join("a.txt");
        let moved_to = temp.path().join("organized/Misc/a.txt");
        fs::create_dir_all(moved_to.parent().unwrap()).expect("mkdir");
        fs::write(temp.path().join("blocked"), "in the way").expect("write");
        fs::write(&moved_to, "a").expect("write");
        undo_log::append(&log, &LogRecord::new(&moved_to, &original)).expect("append");

        let err = undo(&log, false, |_| {}).unwrap_err();

        assert!(matches!(err, UndoError::RestoreFailed { restored: 0, .. }));
        assert!(moved_to.exists(), "entry must stay at its destination");
        assert!(log.exists(), "a failed restore must leave the log intact");
    }

    #[test]
    fn test_undo_recreates_missing_original_parent() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");
        let (orig, _) = record_move(&temp, &log, "a.txt");
        fs::remove_dir_all(orig.parent().unwrap()).expect("remove parent");

        let report = undo(&log, false, |_| {}).expect("undo");
        assert_eq!(report.restored, 1);
        assert!(orig.exists());
    }
}
