//! Configuration: default paths and scan filters, loaded from TOML.
//!
//! Configuration is optional. Lookup order: an explicitly provided file, then
//! `./.tidydeskrc.toml`, then `~/.config/tidydesk/config.toml`, then built-in
//! defaults matching the classic layout (`~/Downloads` and `~/Desktop` into
//! `~/Workspace/Code` and `~/Workspace/Organized`).
//!
//! # Configuration File Format
//!
//! ```toml
//! [paths]
//! sources = ["~/Downloads", "~/Desktop"]
//! code_root = "~/Workspace/Code"
//! organized_root = "~/Workspace/Organized"
//! undo_log = "~/.tidydesk_undo.jsonl"
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db"]
//! patterns = ["*.part", "*.crdownload"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    NotFound(PathBuf),
    /// The file is not valid TOML for this schema.
    Invalid(String),
    /// A glob pattern failed to compile.
    BadGlob(String),
    /// A regex pattern failed to compile, with the compiler's reason.
    BadRegex { pattern: String, reason: String },
    /// The file could not be read.
    Io(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            Self::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::BadGlob(pattern) => write!(f, "Invalid glob pattern '{}'", pattern),
            Self::BadRegex { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            Self::Io(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Source folders, destination roots, and the undo log location.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Rules deciding which scanned names are eligible for organization.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Path defaults. All values accept a leading `~` for the home directory.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    #[serde(default = "default_code_root")]
    pub code_root: String,
    #[serde(default = "default_organized_root")]
    pub organized_root: String,
    #[serde(default = "default_undo_log")]
    pub undo_log: String,
}

fn default_sources() -> Vec<String> {
    vec!["~/Downloads".to_string(), "~/Desktop".to_string()]
}

fn default_code_root() -> String {
    "~/Workspace/Code".to_string()
}

fn default_organized_root() -> String {
    "~/Workspace/Organized".to_string()
}

fn default_undo_log() -> String {
    "~/.tidydesk_undo.jsonl".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            code_root: default_code_root(),
            organized_root: default_organized_root(),
            undo_log: default_undo_log(),
        }
    }
}

/// Expands a leading `~` or `~/` against `$HOME`; other paths pass through.
pub fn expand_tilde(raw: &str) -> PathBuf {
    if let Ok(home) = env::var("HOME") {
        if raw == "~" {
            return PathBuf::from(home);
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Filter rules deciding which entries the scanner hands to classification.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterRules {
    /// Whether hidden entries (leading `.`) are eligible. Defaults to false;
    /// hidden entries are otherwise never classified.
    #[serde(default)]
    pub enable_hidden_files: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    #[serde(default)]
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Names to leave untouched during scanning.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames (e.g. "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the full path (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Lowercased extensions (e.g. "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Whitelist patterns that override every exclude rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl AppConfig {
    /// Loads configuration following the standard lookup order, falling back
    /// to defaults when no file is found. An explicitly provided path that
    /// does not exist is an error; the implicit locations are optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local = PathBuf::from(".tidydeskrc.toml");
        if local.exists() {
            return Self::load_from_file(&local);
        }

        if let Ok(home) = env::var("HOME") {
            let user = PathBuf::from(home)
                .join(".config")
                .join("tidydesk")
                .join("config.toml");
            if user.exists() {
                return Self::load_from_file(&user);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl FilterRules {
    /// Pre-compiles the glob and regex patterns for matching.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|p| Pattern::new(p).map_err(|_| ConfigError::BadGlob(p.clone())))
                .collect::<Result<Vec<_>, _>>()
        };

        let exclude_patterns = compile_globs(&self.exclude.patterns)?;
        let include_patterns = compile_globs(&self.include.patterns)?;

        let exclude_regexes = self
            .exclude
            .regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::BadRegex {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledFilters {
            enable_hidden_files: self.enable_hidden_files,
            exclude_filenames: self.exclude.filenames.into_iter().collect(),
            exclude_extensions: self
                .exclude
                .extensions
                .iter()
                .map(|e| e.to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }
}

/// Filter rules compiled into matchers.
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    /// Decides whether a scanned entry is eligible for organization.
    ///
    /// Include patterns win over everything; then hidden names, exact
    /// filenames, extensions, glob patterns, and regexes exclude in that
    /// order; anything left is eligible.
    pub fn should_include(&self, path: &Path) -> bool {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.include_patterns.iter().any(|p| p.matches_path(path)) {
            return true;
        }

        if !self.enable_hidden_files && name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(name.as_ref()) {
            return false;
        }

        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext) {
                return false;
            }
        }

        if self.exclude_patterns.iter().any(|p| p.matches_path(path)) {
            return false;
        }

        if self.exclude_regexes.iter().any(|r| r.is_match(&name)) {
            return false;
        }

        true
    }
}
