//! Stage-and-swap renaming of a directory tree.
//!
//! Per directory level:
//!  1. stage setup: the caller's output directory, or a sibling staging directory
//!  2. plan: list direct file children, transform each base name
//!  3. reconcile: make destination names unique
//!  4. copy: every file into the staging directory under its new name
//!  5. promote (no output directory only): move non-file children into staging,
//!     remove the original directory, rename staging onto it
//!
//! Step 5 starts only after every copy of step 4 succeeded. Its remove and
//! rename are adjacent with nothing fallible in between. Subdirectories are
//! processed before their parent, so a child's path is stable by the time the
//! parent lists it.

use anyhow::{anyhow, Context, Result};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Span};

use crate::errors::SmartRenameError;
use crate::fs_ops::{DirEntryInfo, FileSystem, StdFileSystem};
use crate::plan::{plan, RenameMapping};
use crate::reconcile::reconcile_with;
use crate::shutdown;
use crate::transform::{transform, TransformOptions};
use crate::unique::{default_format_counter, split_extension, CounterFormatter, ReservedNameSet};

/// Name of the temporary sibling directory that receives renamed copies.
pub const STAGING_DIR_NAME: &str = ".smart_rename.staging";

/// Extra name transform applied after pattern removal.
pub type PostTransformFn = dyn Fn(&str) -> String + Send + Sync;

/// Everything a run needs besides the input directory.
#[derive(Clone, Default)]
pub struct SmartRenameOptions {
    pub transform: TransformOptions,
    /// Write results here and leave the input untouched (no promote).
    pub output_path: Option<PathBuf>,
    /// Defaults to `"name (n)"`.
    pub format_counter: Option<CounterFormatter>,
    pub post_transform: Option<Arc<PostTransformFn>>,
    /// Plan and reconcile only; touch nothing.
    pub dry_run: bool,
}

impl fmt::Debug for SmartRenameOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmartRenameOptions")
            .field("transform", &self.transform)
            .field("output_path", &self.output_path)
            .field("format_counter", &self.format_counter.as_ref().map(|_| "<fn>"))
            .field("post_transform", &self.post_transform.as_ref().map(|_| "<fn>"))
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl SmartRenameOptions {
    pub fn new(transform: TransformOptions) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn format_counter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, u64) -> String + Send + Sync + 'static,
    {
        self.format_counter = Some(Arc::new(f));
        self
    }

    pub fn post_transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.post_transform = Some(Arc::new(f));
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Pattern removal, then the post-transform.
    fn transformed_base(&self, base: &str) -> String {
        let name = transform(base, &self.transform);
        match &self.post_transform {
            Some(post) => post(&name),
            None => name,
        }
    }

}

/// Outcome for one directory level.
#[derive(Debug, Clone)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    /// Where the renamed files ended up (the directory itself after a promote).
    pub destination: PathBuf,
    pub mapping: RenameMapping,
    pub collisions: usize,
    pub promoted: bool,
}

impl DirectoryReport {
    pub fn renamed(&self) -> usize {
        self.mapping.iter().filter(|e| e.is_rename()).count()
    }
}

/// Outcome of a whole run, directories in processing (bottom-up) order.
#[derive(Debug, Clone, Default)]
pub struct RenameReport {
    pub directories: Vec<DirectoryReport>,
}

impl RenameReport {
    pub fn files_processed(&self) -> usize {
        self.directories.iter().map(|d| d.mapping.len()).sum()
    }

    pub fn files_renamed(&self) -> usize {
        self.directories.iter().map(DirectoryReport::renamed).sum()
    }

    pub fn collisions_resolved(&self) -> usize {
        self.directories.iter().map(|d| d.collisions).sum()
    }
}

/// Rename every file under `input` using the real filesystem.
pub fn smart_rename(input: &Path, options: &SmartRenameOptions) -> Result<RenameReport> {
    smart_rename_with(&StdFileSystem::default(), input, options)
}

/// Rename every file under `input` through `fs`.
pub fn smart_rename_with<F: FileSystem + ?Sized>(
    fs: &F,
    input: &Path,
    options: &SmartRenameOptions,
) -> Result<RenameReport> {
    info!(input = %input.display(), dry_run = options.dry_run, "starting rename run");
    let (input, output) = validate_paths(input, options.output_path.as_deref())?;

    let mut report = RenameReport::default();
    if let Err(e) = rename_tree(fs, &input, output.as_deref(), options, &mut report) {
        error!(input = %input.display(), error = %format!("{e:#}"), "rename run failed");
        return Err(e);
    }
    info!(
        directories = report.directories.len(),
        files = report.files_processed(),
        renamed = report.files_renamed(),
        collisions = report.collisions_resolved(),
        "rename run completed"
    );
    Ok(report)
}

/// Depth-first: every subdirectory, then the directory's own files.
pub fn rename_tree<F: FileSystem + ?Sized>(
    fs: &F,
    dir: &Path,
    output_dir: Option<&Path>,
    options: &SmartRenameOptions,
    report: &mut RenameReport,
) -> Result<()> {
    if shutdown::is_requested() {
        return Err(SmartRenameError::Interrupted.into());
    }
    let entries = fs
        .list_entries(dir)
        .with_context(|| format!("list subdirectories of '{}'", dir.display()))?;
    for sub in entries.iter().filter(|e| e.is_dir()) {
        if sub.name == STAGING_DIR_NAME {
            warn!(path = %sub.path.display(), "skipping leftover staging directory");
            continue;
        }
        let sub_output = output_dir.map(|o| o.join(&sub.name));
        rename_tree(fs, &sub.path, sub_output.as_deref(), options, report)?;
    }
    let level = process_directory(fs, dir, output_dir, options)?;
    report.directories.push(level);
    Ok(())
}

/// Rename the direct file children of `input_dir` (one level, no recursion).
pub fn process_directory<F: FileSystem + ?Sized>(
    fs: &F,
    input_dir: &Path,
    output_dir: Option<&Path>,
    options: &SmartRenameOptions,
) -> Result<DirectoryReport> {
    let staging = match output_dir {
        Some(out) => out.to_path_buf(),
        None => staging_path_for(input_dir)?,
    };
    // Every event carries the directory and the phase it belongs to.
    let phase_span = |phase: &'static str| info_span!("dir", path = %input_dir.display(), phase);
    let mut guard = phase_span("plan").entered();
    debug!(staging = %staging.display(), "processing directory");

    // Plan
    let entries = fs
        .list_entries(input_dir)
        .with_context(|| format!("plan: list files in '{}'", input_dir.display()))?;
    let (files, others): (Vec<&DirEntryInfo>, Vec<&DirEntryInfo>) =
        entries.iter().partition(|e| e.is_file());
    let new_bases = derive_new_bases(&files, options)?;
    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    let mut mapping = plan(&paths, |base| {
        new_bases.get(base).cloned().unwrap_or_else(|| base.to_string())
    });

    // Stage setup. An explicit output directory may already hold files; their
    // names are reserved so no copy lands on top of them.
    drop(guard);
    guard = phase_span("stage").entered();
    let mut seed: ReservedNameSet = others
        .iter()
        .map(|e| e.name.to_string_lossy().into_owned())
        .collect();
    if !options.dry_run {
        fs.ensure_dir_exists(&staging)
            .with_context(|| format!("stage setup: '{}'", staging.display()))?;
    }
    if let Some(out) = output_dir {
        // A missing output directory (dry-run) holds nothing yet.
        let existing = if options.dry_run {
            fs.list_entries(out).unwrap_or_default()
        } else {
            fs.list_entries(out)
                .with_context(|| format!("stage setup: list '{}'", out.display()))?
        };
        seed.extend(existing.iter().map(|e| e.name.to_string_lossy().into_owned()));
    } else if !options.dry_run && !fs.list_entries(&staging)?.is_empty() {
        return Err(SmartRenameError::StagingNotEmpty(staging).into());
    }

    // Reconcile
    drop(guard);
    guard = phase_span("reconcile").entered();
    let collisions = match &options.format_counter {
        Some(f) => reconcile_with(&mut mapping, &seed, f.as_ref()),
        None => reconcile_with(&mut mapping, &seed, &default_format_counter),
    };

    for entry in mapping.iter().filter(|e| e.is_rename()) {
        debug!(from = %entry.source.display(), to = %entry.destination.display(), "planned rename");
    }

    if options.dry_run {
        info!(files = mapping.len(), "dry-run: no files copied");
        return Ok(DirectoryReport {
            directory: input_dir.to_path_buf(),
            destination: output_dir.unwrap_or(input_dir).to_path_buf(),
            mapping,
            collisions,
            promoted: false,
        });
    }

    // Copy
    drop(guard);
    guard = phase_span("copy").entered();
    let copy_span = Span::current();
    let required: u64 = files.iter().map(|f| f.len).sum();
    fs.ensure_capacity(&staging, required)?;
    mapping.entries().par_iter().try_for_each(|entry| -> Result<()> {
        let _in_copy = copy_span.enter();
        let name = entry
            .destination
            .file_name()
            .ok_or_else(|| anyhow!("planned destination has no file name: {}", entry.destination.display()))?;
        let target = staging.join(name);
        fs.copy_file(&entry.source, &target).with_context(|| {
            format!(
                "copy phase: '{}' -> '{}'",
                entry.source.display(),
                target.display()
            )
        })
    })?;
    info!(files = mapping.len(), staging = %staging.display(), "staged renamed copies");

    // Promote
    let promoted = output_dir.is_none();
    drop(guard);
    if promoted {
        let _promote = phase_span("promote").entered();
        if shutdown::is_requested() {
            return Err(SmartRenameError::Interrupted.into());
        }
        promote(fs, input_dir, &staging, &others)?;
    }

    Ok(DirectoryReport {
        directory: input_dir.to_path_buf(),
        destination: if promoted { input_dir.to_path_buf() } else { staging },
        mapping,
        collisions,
        promoted,
    })
}

/// Swap `staging` into the place of `input_dir`, carrying non-file children along.
fn promote<F: FileSystem + ?Sized>(
    fs: &F,
    input_dir: &Path,
    staging: &Path,
    others: &[&DirEntryInfo],
) -> Result<()> {
    let mut moved: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(others.len());
    for child in others {
        let target = staging.join(&child.name);
        if let Err(e) = fs.rename_path(&child.path, &target) {
            for (original, carried) in moved.iter().rev() {
                if let Err(back) = fs.rename_path(carried, original) {
                    error!(
                        from = %carried.display(),
                        to = %original.display(),
                        error = %format!("{back:#}"),
                        "failed to move entry back after an aborted promote"
                    );
                }
            }
            return Err(e).with_context(|| {
                format!("promote: move '{}' into staging", child.path.display())
            });
        }
        moved.push((child.path.clone(), target));
    }

    fs.remove_path(input_dir).with_context(|| {
        format!(
            "promote: remove original '{}' (renamed copies are kept in '{}')",
            input_dir.display(),
            staging.display()
        )
    })?;
    fs.rename_path(staging, input_dir).with_context(|| {
        format!(
            "promote: rename '{}' -> '{}' (renamed copies are kept in the former)",
            staging.display(),
            input_dir.display()
        )
    })?;
    info!(dir = %input_dir.display(), "promoted renamed files");
    Ok(())
}

/// Sibling staging directory for `dir`.
pub fn staging_path_for(dir: &Path) -> Result<PathBuf> {
    match dir.parent() {
        Some(parent) if dir.file_name().is_some() => Ok(parent.join(STAGING_DIR_NAME)),
        _ => Err(SmartRenameError::NoParent(dir.to_path_buf()).into()),
    }
}

/// Transformed base name per distinct base, each computed once. Rejects
/// non-UTF-8 names and results that cannot be created inside the staging
/// directory.
fn derive_new_bases(
    files: &[&DirEntryInfo],
    options: &SmartRenameOptions,
) -> Result<HashMap<String, String>> {
    let mut new_bases: HashMap<String, String> = HashMap::new();
    for file in files {
        let name = file
            .name
            .to_str()
            .ok_or_else(|| SmartRenameError::NonUtf8Name(file.path.clone()))?;
        let (base, ext) = split_extension(name);
        let derived = new_bases
            .entry(base.to_string())
            .or_insert_with(|| options.transformed_base(base));
        let new_name = format!("{derived}{ext}");
        let invalid = new_name == "."
            || new_name == ".."
            || new_name.contains('\0')
            || new_name.chars().any(std::path::is_separator);
        if invalid {
            return Err(SmartRenameError::InvalidName {
                source_path: file.path.clone(),
                name: new_name,
            }
            .into());
        }
    }
    Ok(new_bases)
}

/// Canonical input directory, plus an output path that must not sit inside it.
fn validate_paths(input: &Path, output: Option<&Path>) -> Result<(PathBuf, Option<PathBuf>)> {
    let meta = std::fs::metadata(input)
        .map_err(|_| SmartRenameError::InputNotFound(input.to_path_buf()))?;
    if !meta.is_dir() {
        return Err(SmartRenameError::NotADirectory(input.to_path_buf()).into());
    }
    let input = dunce::canonicalize(input)
        .with_context(|| format!("canonicalize '{}'", input.display()))?;

    let output = match output {
        Some(out) => {
            let abs = resolve_output(out)?;
            if abs.starts_with(&input) {
                return Err(SmartRenameError::OutputInsideInput { input, output: abs }.into());
            }
            Some(abs)
        }
        None => None,
    };
    Ok((input, output))
}

/// Output paths may not exist yet: canonicalize the nearest existing ancestor
/// (resolving symlinks there) and re-append the missing tail.
fn resolve_output(out: &Path) -> Result<PathBuf> {
    let abs = std::path::absolute(out)
        .with_context(|| format!("resolve output path '{}'", out.display()))?;
    for ancestor in abs.ancestors() {
        if let Ok(real) = dunce::canonicalize(ancestor) {
            let tail = abs.strip_prefix(ancestor).unwrap_or(Path::new(""));
            return Ok(if tail.as_os_str().is_empty() { real } else { real.join(tail) });
        }
    }
    Ok(abs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Pattern;
    use std::fs;
    use tempfile::tempdir;

    fn remove(patterns: &[&str]) -> SmartRenameOptions {
        SmartRenameOptions::new(TransformOptions::new(
            patterns.iter().map(|p| Pattern::literal(*p)).collect(),
        ))
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut v: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        v.sort();
        v
    }

    #[test]
    fn staging_is_a_sibling() {
        assert_eq!(
            staging_path_for(Path::new("/data/photos")).unwrap(),
            PathBuf::from("/data/.smart_rename.staging")
        );
        assert!(staging_path_for(Path::new("/")).is_err());
    }

    #[test]
    fn transformed_base_applies_post_transform() {
        let o = remove(&["-icon"]).post_transform(|s| s.to_uppercase());
        assert_eq!(o.transformed_base("photo-icon"), "PHOTO");
        assert_eq!(remove(&["all"]).transformed_base("all"), "");
    }

    #[test]
    fn post_transform_runs_once_per_distinct_base() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let td = tempdir().unwrap();
        let dir = td.path().join("in");
        fs::create_dir(&dir).unwrap();
        for name in ["a.txt", "a.png", "b.txt"] {
            fs::write(dir.join(name), b"x").unwrap();
        }
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let opts = remove(&[]).dry_run(true).post_transform(move |s| {
            counter.fetch_add(1, Ordering::SeqCst);
            s.to_string()
        });
        process_directory(&StdFileSystem::default(), &dir, None, &opts).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_output_resolves_through_existing_ancestor() {
        let td = tempdir().unwrap();
        let real = dunce::canonicalize(td.path()).unwrap();
        let out = resolve_output(&td.path().join("new").join("deeper")).unwrap();
        assert_eq!(out, real.join("new").join("deeper"));
    }

    #[test]
    fn process_directory_swaps_in_place() {
        let td = tempdir().unwrap();
        let dir = td.path().join("in");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("photo-icon.png"), b"icon").unwrap();
        fs::write(dir.join("photo-logo.png"), b"logo").unwrap();

        let opts = remove(&["-icon", "-logo"]);
        let rep = process_directory(&StdFileSystem::default(), &dir, None, &opts).unwrap();
        assert!(rep.promoted);
        assert_eq!(rep.collisions, 1);
        assert_eq!(names(&dir), vec!["photo (2).png", "photo.png"]);
        assert_eq!(fs::read(dir.join("photo.png")).unwrap(), b"icon");
        assert_eq!(fs::read(dir.join("photo (2).png")).unwrap(), b"logo");
        assert!(!td.path().join(STAGING_DIR_NAME).exists());
    }

    #[test]
    fn leftover_staging_blocks_the_run() {
        let td = tempdir().unwrap();
        let dir = td.path().join("in");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a.txt"), b"a").unwrap();
        let staging = td.path().join(STAGING_DIR_NAME);
        fs::create_dir(&staging).unwrap();
        fs::write(staging.join("stale.txt"), b"s").unwrap();

        let err = process_directory(&StdFileSystem::default(), &dir, None, &remove(&[])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SmartRenameError>(),
            Some(SmartRenameError::StagingNotEmpty(_))
        ));
        assert_eq!(names(&dir), vec!["a.txt"]);
    }

    #[test]
    fn separator_in_new_name_is_rejected() {
        let td = tempdir().unwrap();
        let dir = td.path().join("in");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("a_b.txt"), b"x").unwrap();
        let opts = remove(&[]).post_transform(|s| s.replace('_', "/"));
        let err = process_directory(&StdFileSystem::default(), &dir, None, &opts).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SmartRenameError>(),
            Some(SmartRenameError::InvalidName { .. })
        ));
        assert_eq!(names(&dir), vec!["a_b.txt"]);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let td = tempdir().unwrap();
        let dir = td.path().join("in");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("x-tmp.txt"), b"x").unwrap();
        let rep = process_directory(&StdFileSystem::default(), &dir, None, &remove(&["-tmp"]).dry_run(true)).unwrap();
        assert_eq!(rep.renamed(), 1);
        assert_eq!(names(&dir), vec!["x-tmp.txt"]);
        assert!(!td.path().join(STAGING_DIR_NAME).exists());
    }
}
