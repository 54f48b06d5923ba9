//! Collision reconciliation over a planned mapping.
//!
//! Entries are walked in insertion order. A destination whose file name is
//! already reserved in its directory is resolved with the counter formatter
//! (applied to the name without its extension, extension re-appended); the
//! resulting name is then reserved. The first entry to claim a name keeps it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::plan::RenameMapping;
use crate::unique::{default_format_counter, generate_unique_name, split_extension, ReservedNameSet};

/// Resolve duplicate destination names with the default `"name (n)"` format.
pub fn reconcile(mapping: &mut RenameMapping) -> usize {
    reconcile_with(mapping, &ReservedNameSet::new(), &default_format_counter)
}

/// Resolve duplicate destination names in place.
///
/// `seed` names count as taken in every directory before the walk starts
/// (used for sibling directories and symlinks that will share the directory).
/// Returns the number of destinations that had to be changed.
pub fn reconcile_with(
    mapping: &mut RenameMapping,
    seed: &ReservedNameSet,
    format_counter: &(dyn Fn(&str, u64) -> String + Send + Sync + '_),
) -> usize {
    let mut reserved_by_dir: HashMap<PathBuf, ReservedNameSet> = HashMap::new();
    let mut resolved = 0usize;

    for entry in mapping.entries_mut() {
        let dir = entry
            .destination
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let Some(file_name) = entry.destination.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let file_name = file_name.to_string();
        let reserved = reserved_by_dir
            .entry(dir.clone())
            .or_insert_with(|| seed.clone());

        let final_name = if reserved.contains(&file_name) {
            let unique = generate_unique_name(&file_name, reserved, &|to_format: &str, counter: u64| {
                let (base, ext) = split_extension(to_format);
                format!("{}{}", format_counter(base, counter), ext)
            });
            debug!(
                source = %entry.source.display(),
                wanted = %file_name,
                resolved = %unique,
                "destination name collision resolved"
            );
            entry.destination = dir.join(&unique);
            resolved += 1;
            unique
        } else {
            file_name
        };
        reserved.insert(final_name);
    }

    if resolved > 0 {
        info!(collisions = resolved, "reconciled duplicate destination names");
    }
    resolved
}
