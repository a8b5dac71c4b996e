//! Tree copier: overlays the generated output onto a working copy.
//!
//! Files are copied byte-for-byte and keep the source mode. Missing
//! directories are created and given the source directory's mode once their
//! contents are in place, so a read-only source directory can still be
//! filled. Destination entries absent from the source are left alone.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{io_err, AdapterError};

/// What an overlay touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    pub files: usize,
    pub dirs_created: usize,
}

/// Recursively copy every entry under `source` into `dest`.
pub fn overlay(source: &Path, dest: &Path) -> Result<OverlayStats, AdapterError> {
    if !source.is_dir() {
        return Err(AdapterError::Other(format!(
            "overlay source {} is not a directory",
            source.display()
        )));
    }

    let mut stats = OverlayStats::default();
    let mut created: Vec<(PathBuf, fs::Permissions)> = Vec::new();

    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            io_err(path, e.into())
        })?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| AdapterError::Other(e.to_string()))?;
        let target = dest.join(rel);
        let meta = entry.metadata().map_err(|e| {
            let path = entry.path().to_path_buf();
            io_err(path, e.into())
        })?;

        if meta.is_dir() {
            if !target.is_dir() {
                fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
                created.push((target, meta.permissions()));
                stats.dirs_created += 1;
            }
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        fs::copy(entry.path(), &target).map_err(|e| io_err(&target, e))?;
        fs::set_permissions(&target, meta.permissions()).map_err(|e| io_err(&target, e))?;
        stats.files += 1;
    }

    // Deepest first so restricting a parent never blocks a child.
    for (dir, perms) in created.into_iter().rev() {
        fs::set_permissions(&dir, perms).map_err(|e| io_err(&dir, e))?;
    }

    tracing::debug!(
        "overlaid {} files ({} new directories) from {} onto {}",
        stats.files,
        stats.dirs_created,
        source.display(),
        dest.display()
    );
    Ok(stats)
}
