//! Core library for `smart_rename`.
//!
//! Renames every file in a directory tree by stripping unwanted patterns from
//! the base name, resolving the duplicates that produces, and swapping the
//! renamed copies into place only after every copy succeeded.
//!
//! Layers, bottom-up:
//! - [`transform`]: pure name cleanup (pattern removal, whitespace stripping)
//! - [`unique`]: counter-based unique names
//! - [`plan`] / [`reconcile`]: old path -> new path mapping, then de-duplication
//! - [`rename`]: the stage-and-swap orchestrator over a [`fs_ops::FileSystem`]
//!
//! `config`, `cli` and `output` support the binary.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod plan;
pub mod platform;
pub mod reconcile;
pub mod rename;
pub mod shutdown;
pub mod transform;
pub mod unique;

pub use config::{default_config_path, default_log_path, path_has_symlink_ancestor, Config, LogLevel};
pub use errors::SmartRenameError;
pub use fs_ops::{FileSystem, StdFileSystem};
pub use plan::{plan, RenameEntry, RenameMapping};
pub use reconcile::{reconcile, reconcile_with};
pub use rename::{smart_rename, smart_rename_with, DirectoryReport, RenameReport, SmartRenameOptions};
pub use transform::{clean, transform, CleanOptions, Pattern, TransformOptions};
pub use unique::{default_format_counter, generate_unique_name, CounterTemplate, ReservedNameSet};
