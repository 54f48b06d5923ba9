//! Metadata preservation for staged copies.
//! Copies timestamps (atime, mtime) and, on Unix, the permission bits from the
//! source. Best-effort: failures are logged and never fail the copy.

use filetime::{set_file_times, FileTime};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

pub(super) fn preserve_metadata(dest: &Path, src_meta: &fs::Metadata) {
    let atime = FileTime::from_last_access_time(src_meta);
    let mtime = FileTime::from_last_modification_time(src_meta);
    match set_file_times(dest, atime, mtime) {
        Ok(()) => trace!(path = %dest.display(), "set atime/mtime on staged copy"),
        Err(e) => warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on staged copy"),
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = src_meta.permissions().mode() & 0o7777;
        if let Err(e) = fs::set_permissions(dest, fs::Permissions::from_mode(mode)) {
            warn!(path = %dest.display(), mode = format!("{mode:o}"), error = %e, "failed to set permissions on staged copy");
        }
    }
    #[cfg(not(unix))]
    {
        if src_meta.permissions().readonly() {
            if let Ok(meta) = fs::metadata(dest) {
                let mut perms = meta.permissions();
                perms.set_readonly(true);
                let _ = fs::set_permissions(dest, perms);
            }
        }
    }
}
