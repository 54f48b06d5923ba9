//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Patterns given with -r are appended after the ones from config.xml.
//! - Pattern values may start with '-' (`-r -icon`).

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};

/// Strip unwanted text from file names across a directory tree.
/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Rename files by removing patterns from their names, resolving duplicates safely"
)]
pub struct Args {
    /// Directory whose files (recursively) are renamed.
    #[arg(value_name = "INPUT_DIR", value_hint = ValueHint::DirPath, required_unless_present_any = ["print_config", "init_config"])]
    pub input_dir: Option<PathBuf>,

    /// Pattern to remove from names; repeatable. `re:<regex>`, `lit:<text>` or plain text.
    #[arg(
        short = 'r',
        long = "remove",
        value_name = "PATTERN",
        action = clap::ArgAction::Append,
        allow_hyphen_values = true
    )]
    pub remove: Vec<String>,

    /// Strip all whitespace from names after pattern removal.
    #[arg(short = 's', long)]
    pub remove_spaces: bool,

    /// Write renamed files here and leave the input untouched.
    #[arg(short = 'o', long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Duplicate-name format using {name} and {n}, e.g. "{name}_{n}".
    #[arg(long, value_name = "TEMPLATE")]
    pub counter_format: Option<String>,

    /// Lowercase names after pattern removal.
    #[arg(long)]
    pub lowercase: bool,

    /// Dry-run: print the planned renames but do not modify the filesystem.
    #[arg(long, help = "Show what would be renamed, but do not modify files/directories")]
    pub dry_run: bool,

    /// Preserve permissions and timestamps on the renamed copies.
    #[arg(long)]
    pub preserve_metadata: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Emit logs in structured JSON.
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Also write logs to this file.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Print the config file location in use, then exit.
    #[arg(long, help = "Print the config file location used by smart_rename and exit")]
    pub print_config: bool,

    /// Write a template config file at the default location, then exit.
    #[arg(long, help = "Write a template config.xml and exit")]
    pub init_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        cfg.patterns.extend(self.remove.iter().cloned());
        if self.remove_spaces {
            cfg.remove_spaces = true;
        }
        if let Some(out) = &self.output {
            cfg.output_path = Some(out.clone());
        }
        if let Some(fmt) = &self.counter_format {
            cfg.counter_format = Some(fmt.clone());
        }
        if self.lowercase {
            cfg.lowercase = true;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.preserve_metadata {
            cfg.preserve_metadata = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
