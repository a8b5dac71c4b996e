//! Hosting-platform adapter: authentication check and review-request
//! (pull request) creation.

use agentspack_core::{BranchName, RepositoryTarget};

use crate::command;
use crate::error::{AdapterError, SyncError};

/// Operations against the remote hosting platform.
pub trait Hosting: Send + Sync {
    /// Fail with [`SyncError::PrerequisiteMissing`] when the platform cannot
    /// be reached with valid credentials. Called once, before any clone.
    fn check_authenticated(&self) -> Result<(), SyncError>;

    /// Open a review request merging `source` into `base` on `target` and
    /// return its URL.
    fn create_review_request(
        &self,
        target: &RepositoryTarget,
        source: &BranchName,
        base: &str,
    ) -> Result<String, AdapterError>;
}

/// [`Hosting`] backed by the GitHub CLI (`gh`).
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
    title: String,
    body: String,
}

impl GhCli {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            program: "gh".to_owned(),
            title: title.into(),
            body: body.into(),
        }
    }
}

impl Hosting for GhCli {
    fn check_authenticated(&self) -> Result<(), SyncError> {
        if let Err(e) = command::run(&self.program, ["--version"], None) {
            return Err(SyncError::PrerequisiteMissing {
                tool: self.program.clone(),
                detail: e.to_string(),
                hint: "install the GitHub CLI from https://cli.github.com".to_owned(),
            });
        }
        command::run(&self.program, ["auth", "status"], None)
            .map(|_| ())
            .map_err(|e| SyncError::PrerequisiteMissing {
                tool: self.program.clone(),
                detail: e.to_string(),
                hint: "run `gh auth login` and try again".to_owned(),
            })
    }

    fn create_review_request(
        &self,
        target: &RepositoryTarget,
        source: &BranchName,
        base: &str,
    ) -> Result<String, AdapterError> {
        let repo = target.slug();
        let stdout = command::run(
            &self.program,
            [
                "pr",
                "create",
                "--repo",
                repo.as_str(),
                "--head",
                source.as_str(),
                "--base",
                base,
                "--title",
                self.title.as_str(),
                "--body",
                self.body.as_str(),
            ],
            None,
        )?;
        let Some(url) = review_url(&stdout) else {
            let msg = format!("`gh pr create` printed no URL for {repo}");
            return Err(AdapterError::Other(msg));
        };
        Ok(url)
    }
}

/// `gh pr create` prints progress lines before the URL; the URL is the last
/// non-empty line.
fn review_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_owned)
}
