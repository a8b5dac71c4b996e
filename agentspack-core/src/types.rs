//! Domain types shared by the manifest loader, the settings file and the
//! sync orchestrator.
//!
//! All types are immutable once built; a run's configuration is shared
//! read-only by every per-repository task.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::InvalidTarget;

/// Branch the sync targets when nothing else is configured.
pub const DEFAULT_TARGET_BRANCH: &str = "main";

/// Prefix of every generated sync branch.
pub const DEFAULT_BRANCH_PREFIX: &str = "agentspack";

// ---------------------------------------------------------------------------
// RepositoryTarget
// ---------------------------------------------------------------------------

/// A remote repository named as `owner/name`.
///
/// Both segments are non-empty and free of whitespace. Construct through
/// [`FromStr`]; there is no way to build an invalid value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryTarget {
    owner: String,
    name: String,
}

impl RepositoryTarget {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/name`, the form the hosting CLI expects for `--repo`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryTarget {
    type Err = InvalidTarget;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(InvalidTarget::SegmentCount);
        };
        if owner.is_empty() || name.is_empty() {
            return Err(InvalidTarget::EmptySegment);
        }
        if owner.chars().chain(name.chars()).any(char::is_whitespace) {
            return Err(InvalidTarget::Whitespace);
        }
        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }
}

impl TryFrom<String> for RepositoryTarget {
    type Error = InvalidTarget;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RepositoryTarget> for String {
    fn from(t: RepositoryTarget) -> Self {
        t.slug()
    }
}

impl fmt::Display for RepositoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ---------------------------------------------------------------------------
// ApplyMode / SyncRunConfig
// ---------------------------------------------------------------------------

/// How a pushed sync branch is applied to the target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyMode {
    /// Open a review request (pull request) against the target branch.
    #[default]
    #[serde(alias = "pr", alias = "create-review-request")]
    ReviewRequest,
    /// Merge the sync branch into the target branch and push.
    #[serde(alias = "merge-directly")]
    Merge,
}

impl fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyMode::ReviewRequest => write!(f, "review-request"),
            ApplyMode::Merge => write!(f, "merge"),
        }
    }
}

/// The operator's choices for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRunConfig {
    pub target_branch: String,
    pub apply_mode: ApplyMode,
}

impl Default for SyncRunConfig {
    fn default() -> Self {
        Self {
            target_branch: DEFAULT_TARGET_BRANCH.to_owned(),
            apply_mode: ApplyMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// BranchName
// ---------------------------------------------------------------------------

/// Name of the branch a run pushes to every repository.
///
/// `<prefix>/update-<YYYYMMDD-HHMMSS>-<6 hex>`. The timestamp lets operators
/// correlate a batch; the hex suffix keeps two runs started in the same
/// second apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchName(pub String);

impl BranchName {
    /// Build a branch name from explicit parts.
    pub fn for_run(prefix: &str, started_at: DateTime<Utc>, disambiguator: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        Self(format!(
            "{prefix}/update-{}-{disambiguator}",
            started_at.format("%Y%m%d-%H%M%S")
        ))
    }

    /// Build a branch name for a run starting at `started_at` with a fresh
    /// disambiguator.
    pub fn generate(prefix: &str, started_at: DateTime<Utc>) -> Self {
        Self::for_run(prefix, started_at, &disambiguator())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for BranchName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

fn disambiguator() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut h = Sha256::new();
    h.update(std::process::id().to_le_bytes());
    h.update(nanos.to_le_bytes());
    h.update(COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    let mut digest = hex::encode(h.finalize());
    digest.truncate(6);
    digest
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn target_parses_owner_and_name() {
        let t: RepositoryTarget = "acme/widgets".parse().unwrap();
        assert_eq!(t.owner(), "acme");
        assert_eq!(t.name(), "widgets");
        assert_eq!(t.to_string(), "acme/widgets");
    }

    #[test]
    fn target_rejects_bad_shapes() {
        assert_eq!(
            "malformed".parse::<RepositoryTarget>(),
            Err(InvalidTarget::SegmentCount)
        );
        assert_eq!(
            "a/b/c".parse::<RepositoryTarget>(),
            Err(InvalidTarget::SegmentCount)
        );
        assert_eq!(
            "/b".parse::<RepositoryTarget>(),
            Err(InvalidTarget::EmptySegment)
        );
        assert_eq!(
            "a/".parse::<RepositoryTarget>(),
            Err(InvalidTarget::EmptySegment)
        );
        assert_eq!(
            "a b/c".parse::<RepositoryTarget>(),
            Err(InvalidTarget::Whitespace)
        );
        assert_eq!(
            "a/c\td".parse::<RepositoryTarget>(),
            Err(InvalidTarget::Whitespace)
        );
    }

    #[test]
    fn target_serializes_as_slug() {
        let t: RepositoryTarget = "acme/widgets".parse().unwrap();
        let yaml = serde_yaml::to_string(&t).unwrap();
        assert_eq!(yaml.trim(), "acme/widgets");
        let back: RepositoryTarget = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, t);
        assert!(serde_yaml::from_str::<RepositoryTarget>("nope").is_err());
    }

    #[test]
    fn apply_mode_accepts_aliases() {
        let pr: ApplyMode = serde_yaml::from_str("pr").unwrap();
        assert_eq!(pr, ApplyMode::ReviewRequest);
        let long: ApplyMode = serde_yaml::from_str("create-review-request").unwrap();
        assert_eq!(long, ApplyMode::ReviewRequest);
        let merge: ApplyMode = serde_yaml::from_str("merge-directly").unwrap();
        assert_eq!(merge, ApplyMode::Merge);
        assert_eq!(ApplyMode::ReviewRequest.to_string(), "review-request");
    }

    #[test]
    fn run_config_defaults_to_main_and_review_request() {
        let cfg = SyncRunConfig::default();
        assert_eq!(cfg.target_branch, "main");
        assert_eq!(cfg.apply_mode, ApplyMode::ReviewRequest);
    }

    #[test]
    fn branch_name_embeds_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 7).unwrap();
        let b = BranchName::for_run("agentspack/", at, "abc123");
        assert_eq!(b.as_str(), "agentspack/update-20261018-090507-abc123");
    }

    #[test]
    fn branch_names_in_the_same_second_differ() {
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, 5, 7).unwrap();
        let a = BranchName::generate(DEFAULT_BRANCH_PREFIX, at);
        let b = BranchName::generate(DEFAULT_BRANCH_PREFIX, at);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("agentspack/update-20261018-090507-"));
    }
}
