//! Last step of a staged copy: move the finished temp file onto its name.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::trace;

use super::helpers::io_error_with_help;
use super::util;

/// Rename `tmp` onto `dest` within one staging or output directory.
///
/// Both paths share a parent, so the rename never crosses devices and a
/// reader sees either nothing or the complete copy. A failed directory
/// fsync is traced, not returned: the file is already in place.
pub(super) fn publish(tmp: &Path, dest: &Path) -> Result<()> {
    fs::rename(tmp, dest).map_err(io_error_with_help("publish staged copy", dest))?;
    if let Some(dir) = dest.parent() {
        if let Err(e) = util::fsync_dir(dir) {
            trace!(dir = %dir.display(), error = %e, "directory fsync after publish failed");
        }
    }
    Ok(())
}
