//! Typed error definitions for smart_rename.
//! Provides a small set of well-known failure modes for better logs and tests.
//! Raw I/O failures are not listed here: they travel as `anyhow::Error` with the
//! failing operation and path attached (see `fs_ops::io_error_with_help`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmartRenameError {
    #[error("Input directory not found: {0}")]
    InputNotFound(PathBuf),

    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Directory has no parent to hold a staging directory: {0}")]
    NoParent(PathBuf),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid counter format '{0}': it must contain the {{n}} placeholder")]
    InvalidCounterFormat(String),

    #[error("Transformed name for {source_path} is not a valid file name: '{name}'")]
    InvalidName { source_path: PathBuf, name: String },

    #[error("File name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),

    #[error("Staging directory already exists and is not empty: {0}")]
    StagingNotEmpty(PathBuf),

    #[error("Output directory {output} must not be inside the input tree {input}")]
    OutputInsideInput { input: PathBuf, output: PathBuf },

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl SmartRenameError {
    /// Stable numeric code, used in structured logs and as the process exit code.
    pub fn code(&self) -> i32 {
        match self {
            SmartRenameError::InputNotFound(_) => 10,
            SmartRenameError::NotADirectory(_) => 11,
            SmartRenameError::NoParent(_) => 12,
            SmartRenameError::InvalidPattern { .. } => 20,
            SmartRenameError::InvalidCounterFormat(_) => 21,
            SmartRenameError::InvalidName { .. } => 30,
            SmartRenameError::NonUtf8Name(_) => 31,
            SmartRenameError::StagingNotEmpty(_) => 40,
            SmartRenameError::OutputInsideInput { .. } => 41,
            SmartRenameError::Interrupted => 130,
        }
    }

    /// Short machine-friendly label for the `kind` field of error logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SmartRenameError::InputNotFound(_) => "input_not_found",
            SmartRenameError::NotADirectory(_) => "not_a_directory",
            SmartRenameError::NoParent(_) => "no_parent",
            SmartRenameError::InvalidPattern { .. } => "invalid_pattern",
            SmartRenameError::InvalidCounterFormat(_) => "invalid_counter_format",
            SmartRenameError::InvalidName { .. } => "invalid_name",
            SmartRenameError::NonUtf8Name(_) => "non_utf8_name",
            SmartRenameError::StagingNotEmpty(_) => "staging_not_empty",
            SmartRenameError::OutputInsideInput { .. } => "output_inside_input",
            SmartRenameError::Interrupted => "interrupted",
        }
    }
}
