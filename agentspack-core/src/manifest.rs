//! Repository manifest loader.
//!
//! The manifest is a UTF-8 text file with one `owner/name` per line:
//!
//! ```text
//! # repositories that receive the generated agent files
//! acme/api
//! acme/web
//! ```
//!
//! Blank lines and `#`-prefixed lines are skipped. Malformed lines are
//! dropped with a warning; they never fail the load.

use std::path::Path;

use crate::error::{InvalidTarget, ManifestError};
use crate::types::RepositoryTarget;

/// Conventional manifest file name, looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "sync_repos.md";

/// A manifest line that did not parse as a repository target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    /// 1-based line number in the manifest.
    pub line: usize,
    pub entry: String,
    pub reason: InvalidTarget,
}

/// Result of parsing a manifest: valid targets in file order plus every
/// rejected line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    pub targets: Vec<RepositoryTarget>,
    pub rejected: Vec<RejectedEntry>,
}

/// Parse manifest text. Pure; never fails.
pub fn parse(contents: &str) -> ParsedManifest {
    let mut parsed = ParsedManifest::default();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<RepositoryTarget>() {
            Ok(target) => parsed.targets.push(target),
            Err(reason) => parsed.rejected.push(RejectedEntry {
                line: idx + 1,
                entry: line.to_owned(),
                reason,
            }),
        }
    }
    parsed
}

/// Read and parse the manifest at `path`, keeping the rejected entries.
pub fn load_detailed(path: &Path) -> Result<ParsedManifest, ManifestError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&contents))
}

/// Read the manifest at `path` and return its valid targets in file order.
///
/// Each rejected line is logged as a warning. An empty result is not an
/// error; the caller decides what "nothing to do" means.
pub fn load(path: &Path) -> Result<Vec<RepositoryTarget>, ManifestError> {
    let parsed = load_detailed(path)?;
    for rejected in &parsed.rejected {
        tracing::warn!(
            "{}:{}: invalid repository '{}' ({}), skipping",
            path.display(),
            rejected.line,
            rejected.entry,
            rejected.reason
        );
    }
    Ok(parsed.targets)
}
