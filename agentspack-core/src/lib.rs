//! agentspack core library: domain types, manifest loading and settings.
//!
//! - [`types`]: repository targets, run configuration, branch names
//! - [`manifest`]: `sync_repos.md` loader
//! - [`settings`]: optional YAML settings file
//! - [`error`]: [`ManifestError`], [`ConfigError`], [`InvalidTarget`]

pub mod error;
pub mod manifest;
pub mod settings;
pub mod types;

pub use error::{ConfigError, InvalidTarget, ManifestError};
pub use manifest::{ParsedManifest, RejectedEntry};
pub use settings::{CommitAuthor, SyncSettings};
pub use types::{ApplyMode, BranchName, RepositoryTarget, SyncRunConfig};
