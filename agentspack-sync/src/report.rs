//! Per-repository outcomes and the aggregated run report.

use chrono::{DateTime, Utc};
use serde::Serialize;

use agentspack_core::{BranchName, RepositoryTarget};

use crate::error::{Stage, StageError};

/// Terminal state a repository reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// A review request was opened; the outcome carries its URL.
    ReviewRequested,
    /// The sync branch was merged into the target branch.
    Merged,
    /// The repository had no commits; the target branch was created.
    Initialized,
    /// The overlay produced no change.
    NoChanges,
    Failed,
}

/// Result of syncing one repository. Exactly one per target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub target: RepositoryTarget,
    pub kind: OutcomeKind,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_stage: Option<Stage>,
}

impl SyncOutcome {
    pub fn review_requested(target: RepositoryTarget, url: String) -> Self {
        Self::succeeded(
            target,
            OutcomeKind::ReviewRequested,
            "review request created",
        )
        .with_url(url)
    }

    pub fn merged(target: RepositoryTarget) -> Self {
        Self::succeeded(target, OutcomeKind::Merged, "merged")
    }

    pub fn initialized(target: RepositoryTarget, branch: &str) -> Self {
        Self::succeeded(
            target,
            OutcomeKind::Initialized,
            format!("initialized {branch} branch"),
        )
    }

    pub fn no_changes(target: RepositoryTarget) -> Self {
        Self::succeeded(target, OutcomeKind::NoChanges, "no changes")
    }

    pub fn failed(target: RepositoryTarget, err: &StageError) -> Self {
        Self {
            target,
            kind: OutcomeKind::Failed,
            success: false,
            message: err.to_string(),
            review_url: None,
            failed_stage: Some(err.stage),
        }
    }

    /// A task that died without reaching a stage boundary (a panic).
    pub fn aborted(target: RepositoryTarget, reason: String) -> Self {
        Self {
            target,
            kind: OutcomeKind::Failed,
            success: false,
            message: reason,
            review_url: None,
            failed_stage: None,
        }
    }

    fn succeeded(target: RepositoryTarget, kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            target,
            kind,
            success: true,
            message: message.into(),
            review_url: None,
            failed_stage: None,
        }
    }

    fn with_url(mut self, url: String) -> Self {
        self.review_url = Some(url);
        self
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Review requests opened, merges and initialized repositories.
    pub updated: usize,
    /// Repositories with no changes.
    pub skipped: usize,
    pub failed: usize,
}

/// Everything a run produced, in manifest order.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub branch: BranchName,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn new(branch: BranchName, started_at: DateTime<Utc>, outcomes: Vec<SyncOutcome>) -> Self {
        Self {
            branch,
            started_at,
            outcomes,
        }
    }

    pub fn summary(&self) -> SyncSummary {
        let mut s = SyncSummary::default();
        for o in &self.outcomes {
            match o.kind {
                OutcomeKind::ReviewRequested | OutcomeKind::Merged | OutcomeKind::Initialized => {
                    s.updated += 1
                }
                OutcomeKind::NoChanges => s.skipped += 1,
                OutcomeKind::Failed => s.failed += 1,
            }
        }
        s
    }

    /// `true` iff at least one repository failed. Skipped repositories count
    /// as success.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| !o.success)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
