//! Error types for agentspack-core.

use std::path::PathBuf;

use thiserror::Error;

/// Why a string could not be parsed as an `owner/name` repository target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTarget {
    #[error("expected exactly one '/' separating owner and name")]
    SegmentCount,

    #[error("owner and name must both be non-empty")]
    EmptySegment,

    #[error("owner and name must not contain whitespace")]
    Whitespace,
}

/// Errors raised while reading the repository manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be opened or read. Fatal to the run.
    #[error("cannot read repository manifest at {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, with the file path and serde_yaml's line context.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
