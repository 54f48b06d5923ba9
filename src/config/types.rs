//! Core configuration types.
//! - Config holds the merged settings (defaults < XML < CLI).
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Phase boundaries and the summary (default)
    #[default]
    Normal,
    /// Every planned rename
    Info,
    /// Resolver iterations and per-file I/O
    Debug,
}

impl LogLevel {
    /// Parse common names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Merged runtime settings. Patterns and the counter format stay textual here;
/// [`Config::to_options`] compiles them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `re:`/`lit:`/plain pattern texts, applied in order
    pub patterns: Vec<String>,
    pub remove_spaces: bool,
    /// Template with `{name}` and `{n}`; None means `"{name} ({n})"`
    pub counter_format: Option<String>,
    /// Lowercase names after pattern removal
    pub lowercase: bool,
    /// Write results here instead of swapping them into the input tree
    pub output_path: Option<PathBuf>,
    pub dry_run: bool,
    /// Carry timestamps and permissions over to renamed copies
    pub preserve_metadata: bool,
    pub log_level: LogLevel,
    pub log_file: Option<PathBuf>,
}
