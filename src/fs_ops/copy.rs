//! Safe copy-and-rename:
//! - Copies to a hidden temp file in the destination directory
//! - The temp file is fsynced (io_copy::copy_streaming)
//! - Publishes temp -> dest by rename, so `dest` never holds a partial file
//! - Optionally carries timestamps and permissions over from the source

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

use super::helpers::io_error_with_help;
use super::publish::publish;
use super::{io_copy, metadata, util};

/// Copy `src` -> `dest` through a temp sibling of `dest`. Returns bytes copied.
pub fn safe_copy_and_rename(src: &Path, dest: &Path, preserve: bool) -> Result<u64> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;

    let tmp_path = util::unique_temp_path(dest_dir);

    let bytes = match io_copy::copy_streaming(src, &tmp_path) {
        Ok(n) => n,
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_error_with_help("copy file", src)(e))
                .with_context(|| format!("staging copy to '{}'", dest.display()));
        }
    };

    if preserve {
        match fs::metadata(src) {
            Ok(meta) => metadata::preserve_metadata(&tmp_path, &meta),
            Err(e) => tracing::warn!(path = %src.display(), error = %e, "cannot stat source; metadata not preserved"),
        }
    }

    if let Err(e) = publish(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    Ok(bytes)
}
