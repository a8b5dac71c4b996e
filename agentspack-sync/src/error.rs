//! Error types for agentspack-sync.
//!
//! Two tiers:
//! - [`SyncError`] is fatal to the whole run and is returned from
//!   [`Orchestrator::run`](crate::Orchestrator::run).
//! - [`StageError`] belongs to one repository. It is turned into a failed
//!   [`SyncOutcome`](crate::SyncOutcome) and never escapes the
//!   per-repository task.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use agentspack_core::ManifestError;

/// Run-fatal errors.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required external tool is missing or not authenticated.
    #[error("{tool} is not ready: {detail}\n  hint: {hint}")]
    PrerequisiteMissing {
        tool: String,
        detail: String,
        hint: String,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// The generated output directory does not exist or is not a directory.
    #[error("generated output directory not found at {path}; run the generator first")]
    OutputMissing { path: PathBuf },
}

/// Failure of a single adapter call.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The external program could not be started at all.
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external program ran and exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Anything else an adapter wants to report.
    #[error("{0}")]
    Other(String),
}

/// Convenience constructor for [`AdapterError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> AdapterError {
    AdapterError::Io {
        path: path.into(),
        source,
    }
}

/// The per-repository stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Creating the temporary working directory.
    Workspace,
    Clone,
    Branch,
    Overlay,
    DiffCheck,
    CommitPush,
    ReviewRequest,
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Workspace => "workspace setup",
            Stage::Clone => "clone",
            Stage::Branch => "branch creation",
            Stage::Overlay => "overlay",
            Stage::DiffCheck => "diff check",
            Stage::CommitPush => "commit/push",
            Stage::ReviewRequest => "review request",
            Stage::Merge => "merge",
        };
        f.write_str(label)
    }
}

/// A stage failure scoped to one repository.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: AdapterError,
}

impl StageError {
    /// Returns a closure that tags an [`AdapterError`] with `stage`, for use
    /// with `map_err`.
    pub(crate) fn at(stage: Stage) -> impl FnOnce(AdapterError) -> StageError {
        move |source| StageError { stage, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_message_names_the_stage() {
        let err = StageError::at(Stage::Clone)(AdapterError::Other("repository not found".into()));
        assert_eq!(err.to_string(), "clone failed: repository not found");
    }

    #[test]
    fn prerequisite_message_carries_hint() {
        let err = SyncError::PrerequisiteMissing {
            tool: "gh".into(),
            detail: "not authenticated".into(),
            hint: "run `gh auth login`".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("gh is not ready"));
        assert!(msg.contains("gh auth login"));
    }
}
