//! Free-space check before a copy batch.

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Headroom kept on top of the batch size.
const CUSHION: u64 = 4 * 1024 * 1024;

pub(super) fn format_bytes(n: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let f = n as f64;
    if f >= GB {
        format!("{:.1} GiB", f / GB)
    } else if f >= MB {
        format!("{:.1} MiB", f / MB)
    } else if f >= KB {
        format!("{:.1} KiB", f / KB)
    } else {
        format!("{} B", n)
    }
}

pub(super) fn ensure_space_for_copy(dst_dir: &Path, required: u64) -> anyhow::Result<()> {
    let Some(free) = free_space_bytes(dst_dir)? else {
        return Ok(());
    };
    if free < required.saturating_add(CUSHION) {
        return Err(anyhow!(
            "not enough free space in '{}' for staged copies: need ~{}, free {}",
            dst_dir.display(),
            format_bytes(required),
            format_bytes(free)
        ));
    }
    Ok(())
}

/// Available bytes at `path`, or None where the platform offers no cheap query.
#[cfg(unix)]
fn free_space_bytes(path: &Path) -> io::Result<Option<u64>> {
    use std::os::unix::ffi::OsStrExt;
    let cpath = std::ffi::CString::new(path.as_os_str().as_bytes())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "path contains NUL"))?;
    let mut s: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(cpath.as_ptr(), &mut s) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(Some((s.f_bavail as u64).saturating_mul(s.f_frsize as u64)))
}

#[cfg(not(unix))]
fn free_space_bytes(_path: &Path) -> io::Result<Option<u64>> {
    Ok(None)
}
