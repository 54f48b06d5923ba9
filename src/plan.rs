//! Rename planning: old path -> proposed new path, in listing order.
//!
//! Only the base name goes through the transform; the extension (with its dot)
//! and the directory are kept verbatim. A transformed base may be empty
//! (`photo.png` -> `.png`); only a name that would be empty as a whole keeps
//! the original. Collisions are not detected here.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::unique::split_extension;

/// One planned rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl RenameEntry {
    /// True when the destination file name differs from the source file name.
    pub fn is_rename(&self) -> bool {
        self.source.file_name() != self.destination.file_name()
    }
}

/// Ordered source -> destination mapping. Iteration order is insertion order,
/// which the planner keeps equal to directory-listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameMapping {
    entries: Vec<RenameEntry>,
}

impl RenameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A new key goes to the end; an existing key keeps its position.
    pub fn insert(&mut self, source: impl Into<PathBuf>, destination: impl Into<PathBuf>) {
        let source = source.into();
        let destination = destination.into();
        match self.entries.iter_mut().find(|e| e.source == source) {
            Some(entry) => entry.destination = destination,
            None => self.entries.push(RenameEntry { source, destination }),
        }
    }

    pub fn get(&self, source: &Path) -> Option<&Path> {
        self.entries
            .iter()
            .find(|e| e.source == source)
            .map(|e| e.destination.as_path())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RenameEntry> {
        self.entries.iter()
    }

    /// Mutable access to entries; only destinations are meant to change.
    pub(crate) fn entries_mut(&mut self) -> std::slice::IterMut<'_, RenameEntry> {
        self.entries.iter_mut()
    }

    pub fn entries(&self) -> &[RenameEntry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a RenameMapping {
    type Item = &'a RenameEntry;
    type IntoIter = std::slice::Iter<'a, RenameEntry>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<S: Into<PathBuf>, D: Into<PathBuf>> FromIterator<(S, D)> for RenameMapping {
    fn from_iter<I: IntoIterator<Item = (S, D)>>(iter: I) -> Self {
        let mut mapping = RenameMapping::new();
        for (s, d) in iter {
            mapping.insert(s, d);
        }
        mapping
    }
}

/// Build the mapping for `files`, applying `transform` to each base name.
///
/// Files whose name is not valid UTF-8 are mapped to themselves; callers that
/// need to reject them do so before planning.
pub fn plan<F>(files: &[PathBuf], transform: F) -> RenameMapping
where
    F: Fn(&str) -> String,
{
    let mut mapping = RenameMapping::new();
    for old_path in files {
        let Some(file_name) = old_path.file_name().and_then(|n| n.to_str()) else {
            mapping.insert(old_path.clone(), old_path.clone());
            continue;
        };
        let (base, ext) = split_extension(file_name);
        let mut new_name = format!("{}{}", transform(base), ext);
        if new_name.is_empty() {
            warn!(path = %old_path.display(), "transform produced an empty name; keeping the original");
            new_name = file_name.to_string();
        }
        let new_path = match old_path.parent() {
            Some(dir) => dir.join(&new_name),
            None => PathBuf::from(&new_name),
        };
        mapping.insert(old_path.clone(), new_path);
    }
    debug!(files = files.len(), planned = mapping.len(), "planned renamed file names");
    mapping
}
