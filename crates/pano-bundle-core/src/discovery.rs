//! Module file discovery
//!
//! A module is a directory under the source root. Every file below it whose
//! name ends with the declaration suffix belongs to the module, unless an
//! exclusion glob matches its path relative to the source root. A module
//! directory that does not exist contributes nothing; one that exists but
//! cannot be listed is an error.

use crate::config::BundleLayout;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn discover_module_files(
    fs: &dyn FileSystem,
    layout: &BundleLayout,
    excludes: &[glob::Pattern],
    module: &str,
) -> Result<Vec<PathBuf>> {
    let dir = layout.module_dir(module);

    if !fs.is_dir(&dir) {
        warn!(
            "Module '{}' not found at {}, contributing nothing",
            module,
            dir.display()
        );
        return Ok(Vec::new());
    }

    let listed = fs
        .list_files(&dir, layout.recursive)
        .map_err(|source| BuildError::ReadModule {
            path: dir.clone(),
            source,
        })?;

    let files: Vec<PathBuf> = listed
        .into_iter()
        .filter(|path| has_suffix(path, &layout.source_suffix))
        .filter(|path| !is_excluded(path, &layout.src_dir, excludes))
        .collect();

    if files.is_empty() {
        debug!("Module '{}' has no {} files", module, layout.source_suffix);
    }

    Ok(files)
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

fn is_excluded(path: &Path, src_dir: &Path, excludes: &[glob::Pattern]) -> bool {
    let relative = path.strip_prefix(src_dir).unwrap_or(path);
    let excluded = excludes
        .iter()
        .any(|pattern| pattern.matches_path(relative));
    if excluded {
        debug!("Excluded: {:?}", path);
    }
    excluded
}
