//! Relocation planning with collision-safe destination naming.
//!
//! [`stage`] walks a batch of entries in discovery order, asks the rule table
//! for each entry's category, and resolves a destination path that neither
//! exists on the filesystem nor clashes with another destination planned in
//! the same batch. No filesystem mutation happens here; the output is a plan
//! that the mover executes later.

use crate::rules::{Category, ClassifyError, Entry, RuleTable};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// The two destination roots every category resolves against.
#[derive(Debug, Clone)]
pub struct DestinationRoots {
    /// Root for code files and project folders.
    pub code: PathBuf,
    /// Root holding the per-category folders for everything else.
    pub organized: PathBuf,
}

impl DestinationRoots {
    pub fn new(code: impl Into<PathBuf>, organized: impl Into<PathBuf>) -> Self {
        Self {
            code: code.into(),
            organized: organized.into(),
        }
    }

    /// Target directory for a category, or `None` for `Skip`.
    pub fn target_dir(&self, category: Category) -> Option<PathBuf> {
        match category {
            Category::Skip => None,
            Category::Code => Some(self.code.clone()),
            other => Some(self.organized.join(other.dir_name())),
        }
    }
}

/// A computed, not-yet-executed move with its collision already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRelocation {
    /// Where the entry currently lives.
    pub source: PathBuf,
    /// Where it will be moved; guaranteed unclaimed at planning time.
    pub destination: PathBuf,
    /// The category that produced this destination.
    pub category: Category,
}

/// Why an entry was dropped from the plan with a visible reason.
///
/// Bare directories without project markers are dropped silently and do not
/// appear here.
#[derive(Debug)]
pub enum SkipReason {
    /// The directory could not be listed for project markers.
    Inaccessible(io::Error),
    /// The path has no final name component to relocate under.
    Unnamed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inaccessible(source) => write!(f, "cannot be listed ({})", source),
            Self::Unnamed => write!(f, "has no file name component"),
        }
    }
}

/// An entry excluded from the plan, with the reason to report.
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// The ordered output of a staging pass.
#[derive(Debug, Default)]
pub struct StagePlan {
    /// Relocations to execute, in discovery order.
    pub planned: Vec<PlannedRelocation>,
    /// Entries that need a skip-with-reason report.
    pub skipped: Vec<SkippedEntry>,
}

/// Plans relocations for a batch of entries.
///
/// Entries are processed in the order given; there is no reordering or
/// batching by category. Classification failures never abort the rest of the
/// batch — the affected entry is recorded in `skipped` and staging continues.
pub fn stage(entries: &[Entry], rules: &RuleTable, roots: &DestinationRoots) -> StagePlan {
    let mut plan = StagePlan::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for entry in entries {
        let category = match rules.classify(entry) {
            Ok(category) => category,
            Err(ClassifyError::Inaccessible { path, source }) => {
                plan.skipped.push(SkippedEntry {
                    path,
                    reason: SkipReason::Inaccessible(source),
                });
                continue;
            }
        };

        let Some(target_dir) = roots.target_dir(category) else {
            continue;
        };

        let Some(name) = entry.path.file_name() else {
            plan.skipped.push(SkippedEntry {
                path: entry.path.clone(),
                reason: SkipReason::Unnamed,
            });
            continue;
        };

        let destination = unique_destination(&target_dir, Path::new(name), &claimed);
        claimed.insert(destination.clone());
        plan.planned.push(PlannedRelocation {
            source: entry.path.clone(),
            destination,
            category,
        });
    }

    plan
}

/// Resolves a destination under `target_dir` that is free right now.
///
/// Probes `target_dir/name` first, then `target_dir/stem_1.ext`,
/// `target_dir/stem_2.ext`, … until a candidate neither exists on the live
/// filesystem nor has been claimed by an earlier relocation in the same
/// batch. The index is unbounded; termination follows from the finite number
/// of existing entries. The filesystem can still change between planning and
/// execution, so a destination created by another process in that window is
/// not detected here.
pub fn unique_destination(target_dir: &Path, name: &Path, claimed: &HashSet<PathBuf>) -> PathBuf {
    let available = |candidate: &Path| !candidate.exists() && !claimed.contains(candidate);

    let first = target_dir.join(name);
    if available(&first) {
        return first;
    }

    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = name
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut idx: u64 = 1;
    loop {
        let candidate = target_dir.join(format!("{}_{}{}", stem, idx, suffix));
        if available(&candidate) {
            return candidate;
        }
        idx += 1;
    }
}
