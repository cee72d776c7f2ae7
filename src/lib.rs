//! tidydesk — rules-based tidying for loose files and project folders.
//!
//! Scans a set of source folders (Downloads and Desktop by default),
//! classifies every loose file and top-level directory against a fixed rule
//! table, moves each into its category destination with collision-safe
//! naming, and records every completed move in an append-only undo log so a
//! run can be fully reverted later.

pub mod cli;
pub mod config;
pub mod mover;
pub mod output;
pub mod plan;
pub mod rules;
pub mod undo;
pub mod undo_log;

pub use cli::{Cli, RunOptions, RunSummary};
pub use config::{AppConfig, CompiledFilters, ConfigError, FilterRules};
pub use mover::ExecuteError;
pub use plan::{DestinationRoots, PlannedRelocation, StagePlan};
pub use rules::{Category, ClassifyError, Entry, EntryKind, RuleTable};
pub use undo::{UndoError, UndoReport};
pub use undo_log::LogRecord;
