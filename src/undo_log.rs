//! The append-only undo log.
//!
//! One JSON object per line, two string fields: `moved_to` (the destination
//! actually written) and `from` (the original source path). A record is
//! appended only after its move has succeeded, so the log never claims work
//! that did not happen. The file accumulates across organize runs until an
//! undo consumes and deletes it.

use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A persisted (destination, original source) pair for one completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Absolute path the entry was moved to.
    pub moved_to: PathBuf,
    /// Absolute path the entry came from.
    #[serde(rename = "from")]
    pub original: PathBuf,
}

impl LogRecord {
    pub fn new(moved_to: impl Into<PathBuf>, original: impl Into<PathBuf>) -> Self {
        Self {
            moved_to: moved_to.into(),
            original: original.into(),
        }
    }
}

/// Errors raised while reading or writing the undo log.
#[derive(Debug)]
pub enum LogError {
    /// The log file or its parent directory could not be accessed.
    Io { path: PathBuf, source: io::Error },
    /// A record could not be serialized to a log line.
    Encode { reason: String },
    /// A log line is not a valid record.
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Undo log error at {}: {}", path.display(), source)
            }
            Self::Encode { reason } => write!(f, "Cannot encode undo record: {}", reason),
            Self::Parse { path, line, reason } => {
                write!(
                    f,
                    "Malformed undo record in {} (line {}): {}",
                    path.display(),
                    line,
                    reason
                )
            }
        }
    }
}

impl std::error::Error for LogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn io_err(path: &Path) -> impl Fn(io::Error) -> LogError + '_ {
    move |source| LogError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Appends one record, creating the log file and its parent directory on
/// first use.
pub fn append(path: &Path, record: &LogRecord) -> Result<(), LogError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_err(path))?;
    }

    let line = serde_json::to_string(record).map_err(|e| LogError::Encode {
        reason: e.to_string(),
    })?;

    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(io_err(path))?;
    writeln!(file, "{}", line).map_err(io_err(path))?;
    Ok(())
}

/// Loads every record in file order. An absent log yields an empty list;
/// blank lines are ignored; a malformed line is an error.
pub fn load(path: &Path) -> Result<Vec<LogRecord>, LogError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = fs::File::open(path).map_err(io_err(path))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| LogError::Parse {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Removes the log file. Deleting an absent log is not an error.
pub fn delete(path: &Path) -> Result<(), LogError> {
    if path.exists() {
        fs::remove_file(path).map_err(io_err(path))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_absent_log_is_empty() {
        let temp = TempDir::new().expect("temp dir");
        let records = load(&temp.path().join("missing.jsonl")).expect("load");
        assert!(records.is_empty());
    }

    #[test]
    fn test_append_then_load_preserves_order() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");

        let first = LogRecord::new("/organized/Misc/a.txt", "/downloads/a.txt");
        let second = LogRecord::new("/organized/Misc/b.txt", "/downloads/b.txt");
        append(&log, &first).expect("append");
        append(&log, &second).expect("append");

        let records = load(&log).expect("load");
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn test_append_creates_parent_directory() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("state").join("undo.jsonl");

        append(&log, &LogRecord::new("/dst/x", "/src/x")).expect("append");
        assert!(log.exists());
    }

    #[test]
    fn test_record_wire_field_names() {
        let record = LogRecord::new("/organized/Docs/notes.pdf", "/downloads/notes.pdf");
        let line = serde_json::to_string(&record).expect("encode");
        assert!(line.contains("\"moved_to\""));
        assert!(line.contains("\"from\""));
        assert!(!line.contains("original"));
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");
        std::fs::write(
            &log,
            "{\"moved_to\":\"/d/a\",\"from\":\"/s/a\"}\n\n{\"moved_to\":\"/d/b\",\"from\":\"/s/b\"}\n",
        )
        .expect("write");

        let records = load(&log).expect("load");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_rejects_malformed_line() {
        let temp = TempDir::new().expect("temp dir");
        let log = temp.path().join("undo.jsonl");
        std::fs::write(&log, "not json\n").expect("write");

        let err = load(&log).unwrap_err();
        assert!(matches!(err, LogError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_delete_absent_log_is_ok() {
        let temp = TempDir::new().expect("temp dir");
        delete(&temp.path().join("missing.jsonl")).expect("delete");
    }
}
