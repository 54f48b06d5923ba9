use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static SEQ: AtomicU64 = AtomicU64::new(0);

/// Hidden, unique temp file path inside `dst_dir`.
/// Pattern: .smart_rename.<pid>.<nanos>.<seq>.tmp (the sequence keeps parallel copies apart).
pub(super) fn unique_temp_path(dst_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    dst_dir.join(format!(".smart_rename.{pid}.{nanos}.{seq}.tmp"))
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(not(unix))]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn temp_paths_are_unique_and_hidden() {
        let dir = Path::new("/tmp/x");
        let paths: HashSet<PathBuf> = (0..64).map(|_| unique_temp_path(dir)).collect();
        assert_eq!(paths.len(), 64);
        for p in &paths {
            assert_eq!(p.parent(), Some(dir));
            let name = p.file_name().unwrap().to_string_lossy();
            assert!(name.starts_with(".smart_rename.") && name.ends_with(".tmp"));
        }
    }
}
