//! Repository sync orchestration.
//!
//! ## Per-repository state machine
//!
//! ```text
//! Start → Cloned → BranchReady → Overlaid → DiffChecked ─┬─ NoChanges
//!                                                        └─ CommittedPushed ─┬─ Initialized   (empty repo)
//!                                                                            ├─ ReviewRequested
//!                                                                            └─ Merged
//!   any stage error → Failed
//! ```
//!
//! Each repository gets its own temporary working copy, removed on every
//! exit path. A failure (or panic) in one repository never stops the others.
//! Repositories run on a bounded worker pool; outcomes are collected in
//! manifest order.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use agentspack_core::{
    manifest, ApplyMode, BranchName, RepositoryTarget, SyncRunConfig, SyncSettings,
};

use crate::error::{io_err, Stage, StageError, SyncError};
use crate::hosting::Hosting;
use crate::overlay::overlay;
use crate::report::{SyncOutcome, SyncReport};
use crate::vcs::VersionControl;

/// Prefix of every per-repository temporary directory.
pub const WORKSPACE_PREFIX: &str = "agentspack-sync-";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Run-wide, read-only inputs shared by every repository task.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub run: SyncRunConfig,
    /// Generated output tree. Read, never written.
    pub output_dir: PathBuf,
    pub branch: BranchName,
    pub started_at: DateTime<Utc>,
    pub commit_message: String,
    /// Worker count; `1` processes repositories strictly one at a time.
    pub jobs: usize,
}

impl SyncOptions {
    /// Build options from resolved settings, stamping the run start now.
    pub fn from_settings(settings: &SyncSettings) -> Self {
        let started_at = Utc::now();
        Self {
            run: settings.run_config(),
            output_dir: settings.output_dir.clone(),
            branch: BranchName::generate(&settings.branch_prefix, started_at),
            started_at,
            commit_message: settings.commit_message.clone(),
            jobs: settings.jobs.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives the adapters for every repository in a manifest.
pub struct Orchestrator<'a, V: ?Sized, H: ?Sized> {
    vcs: &'a V,
    hosting: &'a H,
    options: SyncOptions,
}

impl<'a, V, H> Orchestrator<'a, V, H>
where
    V: VersionControl + ?Sized,
    H: Hosting + ?Sized,
{
    pub fn new(vcs: &'a V, hosting: &'a H, options: SyncOptions) -> Self {
        Self {
            vcs,
            hosting,
            options,
        }
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Check external tools before anything is cloned.
    pub fn preflight(&self) -> Result<(), SyncError> {
        self.vcs.check_available()?;
        self.hosting.check_authenticated()?;
        Ok(())
    }

    /// Full run: load the manifest, validate inputs and prerequisites, then
    /// sync every target.
    ///
    /// Only run-fatal problems are returned as errors; per-repository
    /// failures are inside the report.
    pub fn run(&self, manifest_path: &Path) -> Result<SyncReport, SyncError> {
        let targets = manifest::load(manifest_path)?;
        if targets.is_empty() {
            tracing::info!("no repositories listed in {}", manifest_path.display());
            return Ok(self.report(Vec::new()));
        }

        if !self.options.output_dir.is_dir() {
            return Err(SyncError::OutputMissing {
                path: self.options.output_dir.clone(),
            });
        }

        self.preflight()?;
        Ok(self.run_targets(&targets))
    }

    /// Sync `targets` and collect one outcome per target, in input order.
    pub fn run_targets(&self, targets: &[RepositoryTarget]) -> SyncReport {
        tracing::info!(
            "syncing {} repositories on branch {} ({} workers)",
            targets.len(),
            self.options.branch,
            self.options.jobs
        );

        let jobs = self.options.jobs.min(targets.len());
        if jobs <= 1 {
            return self.report(self.run_sequential(targets));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .thread_name(|i| format!("agentspack-sync-{i}"))
            .build();
        let outcomes = match pool {
            // Indexed parallel iterators collect in input order.
            Ok(pool) => pool.install(|| {
                targets
                    .par_iter()
                    .map(|target| self.sync_one(target))
                    .collect::<Vec<_>>()
            }),
            Err(e) => {
                tracing::warn!("worker pool unavailable ({e}); syncing sequentially");
                self.run_sequential(targets)
            }
        };
        self.report(outcomes)
    }

    /// Sync one repository to a terminal outcome. Never fails or panics.
    pub fn sync_one(&self, target: &RepositoryTarget) -> SyncOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.sync_in_workspace(target)));
        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => SyncOutcome::failed(target.clone(), &err),
            Err(payload) => SyncOutcome::aborted(
                target.clone(),
                format!("sync task panicked: {}", panic_message(payload.as_ref())),
            ),
        };

        if outcome.success {
            tracing::info!("{target}: {}", outcome.message);
        } else {
            tracing::warn!("{target}: {}", outcome.message);
        }
        outcome
    }

    fn run_sequential(&self, targets: &[RepositoryTarget]) -> Vec<SyncOutcome> {
        targets.iter().map(|target| self.sync_one(target)).collect()
    }

    fn report(&self, outcomes: Vec<SyncOutcome>) -> SyncReport {
        SyncReport::new(
            self.options.branch.clone(),
            self.options.started_at,
            outcomes,
        )
    }

    /// Own a fresh working copy for the duration of one repository's sync.
    fn sync_in_workspace(&self, target: &RepositoryTarget) -> Result<SyncOutcome, StageError> {
        let workspace = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir()
            .map_err(|e| StageError::at(Stage::Workspace)(io_err(std::env::temp_dir(), e)))?;
        let repo = workspace.path().join("repo");

        let result = self.drive(target, &repo);

        let dir = workspace.path().to_path_buf();
        if let Err(e) = workspace.close() {
            tracing::warn!("could not remove working copy {}: {e}", dir.display());
        }
        result
    }

    fn drive(&self, target: &RepositoryTarget, repo: &Path) -> Result<SyncOutcome, StageError> {
        let run = &self.options.run;
        let branch = &self.options.branch;

        self.vcs
            .clone_shallow(target, repo)
            .map_err(StageError::at(Stage::Clone))?;
        let was_empty = self.vcs.is_empty(repo);
        tracing::debug!("{target}: cloned (empty: {was_empty})");

        self.vcs
            .create_branch(repo, branch, &run.target_branch)
            .map_err(StageError::at(Stage::Branch))?;
        tracing::debug!("{target}: branch ready");

        overlay(&self.options.output_dir, repo).map_err(StageError::at(Stage::Overlay))?;

        let changed = was_empty
            || self
                .vcs
                .has_changes(repo)
                .map_err(StageError::at(Stage::DiffCheck))?;
        if !changed {
            return Ok(SyncOutcome::no_changes(target.clone()));
        }

        self.vcs
            .commit_and_push(repo, &self.options.commit_message)
            .map_err(StageError::at(Stage::CommitPush))?;
        tracing::debug!("{target}: committed and pushed");

        // Nothing to compare against in a repository that had no commits;
        // the push itself created the target branch.
        if was_empty {
            return Ok(SyncOutcome::initialized(target.clone(), &run.target_branch));
        }

        match run.apply_mode {
            ApplyMode::ReviewRequest => {
                let url = self
                    .hosting
                    .create_review_request(target, branch, &run.target_branch)
                    .map_err(StageError::at(Stage::ReviewRequest))?;
                Ok(SyncOutcome::review_requested(target.clone(), url))
            }
            ApplyMode::Merge => {
                self.vcs
                    .merge(repo, branch, &run.target_branch)
                    .map_err(StageError::at(Stage::Merge))?;
                Ok(SyncOutcome::merged(target.clone()))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
