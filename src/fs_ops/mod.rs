//! Filesystem operations used by the rename orchestrator.
//!
//! The orchestrator only talks to the [`FileSystem`] trait; [`StdFileSystem`]
//! is the real implementation. Tests substitute their own to inject failures.

mod copy;
mod helpers;
mod io_copy;
mod metadata;
mod publish;
mod space;
mod util;

pub use copy::safe_copy_and_rename;
pub use helpers::{io_error_with_help, io_error_with_help_io};

use anyhow::{bail, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// What a directory entry is, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, sockets, fifos, devices.
    Other,
}

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub name: OsString,
    pub kind: EntryKind,
    /// Size in bytes for regular files, 0 otherwise.
    pub len: u64,
}

impl DirEntryInfo {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// The filesystem capabilities the rename core relies on.
///
/// Every method either succeeds or returns an error naming the operation and
/// path; none of them may fail silently.
pub trait FileSystem: Sync {
    /// Create `path` (and parents) if absent; succeed if it already is a directory.
    fn ensure_dir_exists(&self, path: &Path) -> Result<()>;

    /// Immediate children of `path`, sorted by file name.
    fn list_entries(&self, path: &Path) -> Result<Vec<DirEntryInfo>>;

    /// Copy the full contents of `src` to `dst`.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Remove a file, or a directory recursively.
    fn remove_path(&self, path: &Path) -> Result<()>;

    fn rename_path(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Fail early if `dir` cannot take `required` more bytes.
    fn ensure_capacity(&self, _dir: &Path, _required: u64) -> Result<()> {
        Ok(())
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem {
    /// Carry timestamps and permissions over to copies.
    pub preserve_metadata: bool,
}

impl StdFileSystem {
    pub fn new(preserve_metadata: bool) -> Self {
        Self { preserve_metadata }
    }
}

impl FileSystem for StdFileSystem {
    fn ensure_dir_exists(&self, path: &Path) -> Result<()> {
        match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => return Ok(()),
            Ok(_) => bail!("'{}' exists but is not a directory", path.display()),
            Err(_) => {}
        }
        fs::create_dir_all(path).map_err(io_error_with_help("create directory", path))?;
        debug!(path = %path.display(), "created directory");
        Ok(())
    }

    fn list_entries(&self, path: &Path) -> Result<Vec<DirEntryInfo>> {
        let mut entries = Vec::new();
        for item in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let item = item.map_err(|e| {
                let at = e.path().unwrap_or(path).to_path_buf();
                match e.into_io_error() {
                    Some(io) => io_error_with_help("list directory", &at)(io),
                    None => anyhow::anyhow!("list directory '{}': filesystem loop", at.display()),
                }
            })?;
            let ft = item.file_type();
            let kind = if ft.is_file() {
                EntryKind::File
            } else if ft.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::Other
            };
            let len = match kind {
                EntryKind::File => item
                    .metadata()
                    .map(|m| m.len())
                    .unwrap_or(0),
                _ => 0,
            };
            entries.push(DirEntryInfo {
                name: item.file_name().to_os_string(),
                path: item.into_path(),
                kind,
                len,
            });
        }
        trace!(path = %path.display(), entries = entries.len(), "listed directory");
        Ok(entries)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        let bytes = safe_copy_and_rename(src, dst, self.preserve_metadata)?;
        trace!(src = %src.display(), dst = %dst.display(), bytes, "copied file");
        Ok(())
    }

    fn remove_path(&self, path: &Path) -> Result<()> {
        let meta = fs::symlink_metadata(path).map_err(io_error_with_help("stat before removal", path))?;
        if meta.is_dir() {
            fs::remove_dir_all(path).map_err(io_error_with_help("remove directory", path))?;
        } else {
            fs::remove_file(path).map_err(io_error_with_help("remove file", path))?;
        }
        Ok(())
    }

    fn rename_path(&self, src: &Path, dst: &Path) -> Result<()> {
        fs::rename(src, dst).map_err(io_error_with_help("rename", src))?;
        Ok(())
    }

    fn ensure_capacity(&self, dir: &Path, required: u64) -> Result<()> {
        space::ensure_space_for_copy(dir, required)
    }
}
