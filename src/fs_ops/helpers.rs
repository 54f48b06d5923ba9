//! I/O error context.
//!
//! Every filesystem failure surfaced by this crate names the operation, the path
//! and, when recognisable, a short hint plus the raw OS code.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create staging directory", dir))?;
//!   File::open(p).map_err(io_error_with_help_io("open source file", p))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Hint keyed on the raw OS error code.
#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and write permissions",
        libc::EXDEV => "cross-filesystem; the staging directory must live on the same device",
        libc::EBUSY => "resource busy; another process is using this path",
        libc::ENOENT => "path not found; it may have been removed during the run",
        libc::EEXIST => "already exists",
        libc::ENOTEMPTY => "directory not empty",
        libc::ENOSPC => "insufficient space on device",
        libc::EROFS => "read-only filesystem; cannot write here",
        libc::ENAMETOOLONG => "file name or path too long",
        libc::EMFILE | libc::ENFILE => "too many open files",
        _ => return None,
    };
    Some(hint)
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        5 => "access denied; check permissions",
        17 => "not same device; the staging directory must live on the same volume",
        32 => "sharing violation; file is in use",
        2 | 3 => "path not found; it may have been removed during the run",
        80 | 183 => "already exists",
        112 => "insufficient disk space",
        206 => "file name or path too long",
        _ => return None,
    };
    Some(hint)
}

#[cfg(not(any(unix, windows)))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

/// Hint keyed on the error kind, for errors without a raw OS code.
fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
        io::ErrorKind::NotFound => Some("path not found; it may have been removed during the run"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        _ => None,
    }
}

fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    let hint = match e.raw_os_error() {
        Some(code) => os_hint(code),
        None => kind_hint(e.kind()),
    };
    if let Some(hint) = hint {
        msg.push_str(" - ");
        msg.push_str(hint);
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// Adapter for anyhow::Result code: `.map_err(io_error_with_help(op, path))`.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

/// Adapter for io::Result code; keeps the original ErrorKind.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}
