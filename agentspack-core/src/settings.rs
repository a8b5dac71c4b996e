//! Optional YAML settings file.
//!
//! # Lookup order
//!
//! 1. an explicit path (`--config`)
//! 2. `<cwd>/agentspack.yaml`
//! 3. `<home>/.agentspack/config.yaml`
//! 4. built-in defaults
//!
//! Every field may be omitted. Command-line flags override what is loaded
//! here.
//!
//! # API pattern
//!
//! As with the rest of this crate, lookup has two forms: `resolve_at(cwd,
//! home)` takes explicit directories (tests use `TempDir`), `resolve()`
//! derives them from the process.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::manifest::DEFAULT_MANIFEST;
use crate::types::{ApplyMode, SyncRunConfig, DEFAULT_BRANCH_PREFIX, DEFAULT_TARGET_BRANCH};

/// Settings file name looked up in the working directory.
pub const LOCAL_SETTINGS_FILE: &str = "agentspack.yaml";

/// Where the generator writes its output by default.
pub const DEFAULT_OUTPUT_DIR: &str = "./dist/agentspack";

/// Clone URL template; `{owner}` and `{name}` are substituted per target.
pub const DEFAULT_CLONE_URL: &str = "https://github.com/{owner}/{name}.git";

pub const DEFAULT_COMMIT_MESSAGE: &str =
    "chore: update AI agent configurations\n\nGenerated by agentspack";

pub const DEFAULT_REVIEW_TITLE: &str = "chore: update AI agent configurations";

pub const DEFAULT_REVIEW_BODY: &str = "Generated by agentspack.";

/// Identity used for sync commits when the local git config has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

/// Everything a sync run can be configured with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub target_branch: String,
    pub apply_mode: ApplyMode,
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    /// Number of repositories processed at once; `1` is strictly sequential.
    pub jobs: usize,
    pub branch_prefix: String,
    pub clone_url: String,
    pub commit_message: String,
    pub review_title: String,
    pub review_body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_author: Option<CommitAuthor>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            target_branch: DEFAULT_TARGET_BRANCH.to_owned(),
            apply_mode: ApplyMode::default(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            jobs: 4,
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_owned(),
            clone_url: DEFAULT_CLONE_URL.to_owned(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_owned(),
            review_title: DEFAULT_REVIEW_TITLE.to_owned(),
            review_body: DEFAULT_REVIEW_BODY.to_owned(),
            commit_author: None,
        }
    }
}

impl SyncSettings {
    /// The run-scoped subset shared with every repository task.
    pub fn run_config(&self) -> SyncRunConfig {
        SyncRunConfig {
            target_branch: self.target_branch.clone(),
            apply_mode: self.apply_mode,
        }
    }

    /// Reject values that parse but cannot drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_branch.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "target_branch",
                reason: "must not be empty".to_owned(),
            });
        }
        if self.jobs == 0 {
            return Err(ConfigError::Invalid {
                field: "jobs",
                reason: "must be at least 1".to_owned(),
            });
        }
        if !self.clone_url.contains("{name}") {
            return Err(ConfigError::Invalid {
                field: "clone_url",
                reason: "template must contain {name}".to_owned(),
            });
        }
        Ok(())
    }
}

/// Load settings from an explicit YAML file.
pub fn load_from(path: &Path) -> Result<SyncSettings, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: SyncSettings =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    settings.validate()?;
    Ok(settings)
}

/// `<home>/.agentspack/config.yaml`. Pure, no I/O.
pub fn user_settings_path_at(home: &Path) -> PathBuf {
    home.join(".agentspack").join("config.yaml")
}

/// Find and load settings, starting in `cwd` and falling back to `home`.
///
/// Returns defaults when no file exists.
pub fn resolve_at(cwd: &Path, home: Option<&Path>) -> Result<SyncSettings, ConfigError> {
    let local = cwd.join(LOCAL_SETTINGS_FILE);
    if local.is_file() {
        tracing::debug!("loading settings from {}", local.display());
        return load_from(&local);
    }
    if let Some(home) = home {
        let user = user_settings_path_at(home);
        if user.is_file() {
            tracing::debug!("loading settings from {}", user.display());
            return load_from(&user);
        }
    }
    Ok(SyncSettings::default())
}

/// `resolve_at` using the process working directory and `dirs::home_dir()`.
pub fn resolve() -> Result<SyncSettings, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    resolve_at(&cwd, dirs::home_dir().as_deref())
}
