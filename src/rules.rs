//! Classification rules mapping filesystem entries to destination categories.
//!
//! A [`RuleTable`] holds a fixed, immutable mapping from lowercased file
//! extensions to categories, plus the set of project-marker filenames that
//! identify a directory as a software project root. Classification is pure
//! apart from the single directory listing needed to look for markers.
//!
//! # Examples
//!
//! ```
//! use tidydesk::rules::{Category, RuleTable};
//!
//! let rules = RuleTable::new();
//! assert_eq!(rules.extension_category("pdf"), Some(Category::Documents));
//! assert_eq!(rules.extension_category("rs"), Some(Category::Code));
//! assert_eq!(rules.extension_category("xyz"), None);
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File extensions routed to the code root.
const CODE_EXTENSIONS: &[&str] = &[
    "py", "ipynb", "js", "ts", "tsx", "jsx", "java", "kt", "swift", "go", "rs", "c", "cc", "cpp",
    "h", "hpp", "cs", "rb", "php", "scala", "r", "sql", "html", "css", "scss", "json", "yaml",
    "yml", "toml", "md", "sh", "zsh",
];

/// File extensions routed to `Documents`.
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "txt", "rtf",
];

/// File extensions routed to `Media`.
const MEDIA_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "heic", "svg", "mp4", "mov", "mkv", "mp3", "wav",
];

/// File extensions routed to `Archives`.
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "tar", "gz", "bz2", "xz", "7z", "rar"];

/// File extensions routed to `Apps`.
const APP_EXTENSIONS: &[&str] = &["dmg", "pkg", "app"];

/// Filenames whose presence among a directory's immediate children marks it
/// as a project root.
const PROJECT_MARKERS: &[&str] = &[
    ".git",
    "package.json",
    "pyproject.toml",
    "requirements.txt",
    "Pipfile",
    "Cargo.toml",
    "go.mod",
    "pom.xml",
    "build.gradle",
    "Makefile",
    "Dockerfile",
];

/// Discriminates the two kinds of filesystem entry the organizer handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file (symlinks are treated as files and moved as-is).
    File,
    /// A top-level directory.
    Directory,
}

/// A filesystem entry awaiting classification.
///
/// Entries are read fresh from the filesystem on every run and never cached.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Whether the entry is a file or a directory.
    pub kind: EntryKind,
}

impl Entry {
    /// Creates an entry for a path of the given kind.
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Destination category for a classified entry.
///
/// `Code` routes to its own fixed root; every other concrete category routes
/// to a subdirectory of the organized root named after [`Category::dir_name`].
/// `Skip` means the entry is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Source files and project folders.
    Code,
    /// Office documents, PDFs, plain text.
    Documents,
    /// Images, audio, and video.
    Media,
    /// Compressed archives.
    Archives,
    /// Installers and application bundles.
    Apps,
    /// Files with no recognized extension.
    Misc,
    /// Leave the entry where it is.
    Skip,
}

impl Category {
    /// Returns the directory name used for this category under the organized
    /// root (and the label used in summaries).
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Code => "Code",
            Category::Documents => "Documents",
            Category::Media => "Media",
            Category::Archives => "Archives",
            Category::Apps => "Apps",
            Category::Misc => "Misc",
            Category::Skip => "Skip",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Errors that can occur during classification.
#[derive(Debug)]
pub enum ClassifyError {
    /// A directory's children could not be listed, so it cannot be checked
    /// for project markers. Reported per-entry; never aborts a batch.
    Inaccessible { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inaccessible { path, source } => {
                write!(f, "Cannot list directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ClassifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inaccessible { source, .. } => Some(source),
        }
    }
}

/// The fixed rule table used to classify entries.
///
/// The five extension sets are disjoint by construction; every extension is
/// authored into exactly one set, and a test asserts the union has no
/// overlap.
#[derive(Debug, Clone)]
pub struct RuleTable {
    extensions: HashMap<&'static str, Category>,
    markers: HashSet<&'static str>,
}

impl RuleTable {
    /// Builds the standard rule table.
    pub fn new() -> Self {
        let sets: [(&[&str], Category); 5] = [
            (CODE_EXTENSIONS, Category::Code),
            (DOCUMENT_EXTENSIONS, Category::Documents),
            (MEDIA_EXTENSIONS, Category::Media),
            (ARCHIVE_EXTENSIONS, Category::Archives),
            (APP_EXTENSIONS, Category::Apps),
        ];

        let mut extensions = HashMap::new();
        for (set, category) in sets {
            for ext in set {
                extensions.insert(*ext, category);
            }
        }

        Self {
            extensions,
            markers: PROJECT_MARKERS.iter().copied().collect(),
        }
    }

    /// Looks up the category for a lowercased extension, if any set claims it.
    pub fn extension_category(&self, ext: &str) -> Option<Category> {
        self.extensions.get(ext).copied()
    }

    /// Returns true if the filename is a recognized project marker.
    pub fn is_project_marker(&self, name: &str) -> bool {
        self.markers.contains(name)
    }

    /// Classifies a filesystem entry.
    ///
    /// Files always land in a concrete category (`Misc` when no extension set
    /// matches). Directories are `Code` when any immediate child is a project
    /// marker and `Skip` otherwise; a directory that cannot be listed is
    /// surfaced as [`ClassifyError::Inaccessible`] rather than silently
    /// skipped. Hidden entries are expected to be filtered out by the caller
    /// before they reach this function.
    pub fn classify(&self, entry: &Entry) -> Result<Category, ClassifyError> {
        match entry.kind {
            EntryKind::File => Ok(self.classify_file(&entry.path)),
            EntryKind::Directory => self.classify_directory(&entry.path),
        }
    }

    fn classify_file(&self, path: &Path) -> Category {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.extension_category(&ext).unwrap_or(Category::Misc)
    }

    /// Only the immediate children are inspected; nested projects inside an
    /// otherwise unmarked folder do not count.
    fn classify_directory(&self, path: &Path) -> Result<Category, ClassifyError> {
        let children = fs::read_dir(path).map_err(|source| ClassifyError::Inaccessible {
            path: path.to_path_buf(),
            source,
        })?;

        for child in children.flatten() {
            if let Some(name) = child.file_name().to_str()
                && self.is_project_marker(name)
            {
                return Ok(Category::Code);
            }
        }

        Ok(Category::Skip)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_entry(path: &Path) -> Entry {
        Entry::new(path, EntryKind::File)
    }

    #[test]
    fn test_extension_sets_are_disjoint() {
        let all = [
            CODE_EXTENSIONS,
            DOCUMENT_EXTENSIONS,
            MEDIA_EXTENSIONS,
            ARCHIVE_EXTENSIONS,
            APP_EXTENSIONS,
        ];
        let total: usize = all.iter().map(|set| set.len()).sum();
        let rules = RuleTable::new();
        assert_eq!(
            rules.extensions.len(),
            total,
            "an extension appears in more than one set"
        );
    }

    #[test]
    fn test_classify_file_by_extension() {
        let rules = RuleTable::new();
        assert_eq!(
            rules.classify(&file_entry(Path::new("/tmp/main.rs"))).unwrap(),
            Category::Code
        );
        assert_eq!(
            rules
                .classify(&file_entry(Path::new("/tmp/report.pdf")))
                .unwrap(),
            Category::Documents
        );
        assert_eq!(
            rules
                .classify(&file_entry(Path::new("/tmp/photo.JPG")))
                .unwrap(),
            Category::Media
        );
        assert_eq!(
            rules
                .classify(&file_entry(Path::new("/tmp/backup.tar.gz")))
                .unwrap(),
            Category::Archives
        );
        assert_eq!(
            rules
                .classify(&file_entry(Path::new("/tmp/installer.dmg")))
                .unwrap(),
            Category::Apps
        );
    }

    #[test]
    fn test_unknown_extension_is_misc_never_skip() {
        let rules = RuleTable::new();
        assert_eq!(
            rules
                .classify(&file_entry(Path::new("/tmp/data.xyz")))
                .unwrap(),
            Category::Misc
        );
        assert_eq!(
            rules
                .classify(&file_entry(Path::new("/tmp/noextension")))
                .unwrap(),
            Category::Misc
        );
    }

    #[test]
    fn test_directory_with_marker_is_code() {
        let temp = TempDir::new().expect("temp dir");
        let project = temp.path().join("myapp");
        fs::create_dir(&project).expect("mkdir");
        fs::write(project.join("package.json"), "{}").expect("write marker");

        let rules = RuleTable::new();
        let entry = Entry::new(&project, EntryKind::Directory);
        assert_eq!(rules.classify(&entry).unwrap(), Category::Code);
    }

    #[test]
    fn test_directory_with_git_metadata_is_code() {
        let temp = TempDir::new().expect("temp dir");
        let project = temp.path().join("repo");
        fs::create_dir_all(project.join(".git")).expect("mkdir");

        let rules = RuleTable::new();
        let entry = Entry::new(&project, EntryKind::Directory);
        assert_eq!(rules.classify(&entry).unwrap(), Category::Code);
    }

    #[test]
    fn test_bare_directory_is_skip() {
        let temp = TempDir::new().expect("temp dir");
        let folder = temp.path().join("holiday-photos");
        fs::create_dir(&folder).expect("mkdir");
        fs::write(folder.join("beach.txt"), "notes").expect("write");

        let rules = RuleTable::new();
        let entry = Entry::new(&folder, EntryKind::Directory);
        assert_eq!(rules.classify(&entry).unwrap(), Category::Skip);
    }

    #[test]
    fn test_unlistable_directory_is_inaccessible_not_skip() {
        let rules = RuleTable::new();
        let entry = Entry::new("/definitely/not/a/real/dir", EntryKind::Directory);
        let err = rules.classify(&entry).unwrap_err();
        assert!(matches!(err, ClassifyError::Inaccessible { .. }));
    }

    #[test]
    fn test_marker_lookup() {
        let rules = RuleTable::new();
        assert!(rules.is_project_marker(".git"));
        assert!(rules.is_project_marker("Cargo.toml"));
        assert!(rules.is_project_marker("go.mod"));
        assert!(!rules.is_project_marker("README.md"));
    }
}
