//! Version-control adapter.
//!
//! [`VersionControl`] is the capability the orchestrator drives; [`GitCli`]
//! implements it with the system `git` binary, which picks up whatever SSH
//! keys, credential helpers and tokens the operator already has configured.
//!
//! None of the operations are safe to call concurrently against the *same*
//! working copy. Distinct working copies may be driven in parallel.

use std::ffi::OsStr;
use std::path::Path;

use agentspack_core::{BranchName, CommitAuthor, RepositoryTarget};

use crate::command;
use crate::error::{AdapterError, SyncError};

/// Local working-copy operations against the single remote a copy was
/// cloned from.
pub trait VersionControl: Send + Sync {
    /// Fail with [`SyncError::PrerequisiteMissing`] if the tool is unusable.
    fn check_available(&self) -> Result<(), SyncError>;

    /// Shallow-clone `target` into `dest`, which must not exist yet.
    fn clone_shallow(&self, target: &RepositoryTarget, dest: &Path) -> Result<(), AdapterError>;

    /// `true` when the repository has no commits at all.
    fn is_empty(&self, repo: &Path) -> bool;

    /// Create and check out `branch` from `base`. In an empty repository
    /// there is no base to branch from, so `base` itself becomes the
    /// initial branch.
    fn create_branch(
        &self,
        repo: &Path,
        branch: &BranchName,
        base: &str,
    ) -> Result<(), AdapterError>;

    /// Whether the working tree differs from `HEAD`. Always `true` for an
    /// empty repository.
    fn has_changes(&self, repo: &Path) -> Result<bool, AdapterError>;

    /// Stage everything, commit with `message` and push the current branch.
    fn commit_and_push(&self, repo: &Path, message: &str) -> Result<(), AdapterError>;

    /// Merge `source` into `target` and push `target`.
    fn merge(&self, repo: &Path, source: &BranchName, target: &str) -> Result<(), AdapterError>;
}

/// [`VersionControl`] backed by the `git` command-line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    clone_url: String,
    author: Option<CommitAuthor>,
}

impl GitCli {
    /// `clone_url` is a template; `{owner}` and `{name}` are replaced per
    /// target (e.g. `https://github.com/{owner}/{name}.git`).
    pub fn new(clone_url: impl Into<String>) -> Self {
        Self {
            program: "git".to_owned(),
            clone_url: clone_url.into(),
            author: None,
        }
    }

    /// Commit as `author` instead of the identity in the local git config.
    pub fn with_author(mut self, author: Option<CommitAuthor>) -> Self {
        self.author = author;
        self
    }

    /// Clone URL for `target`.
    pub fn clone_url_for(&self, target: &RepositoryTarget) -> String {
        self.clone_url
            .replace("{owner}", target.owner())
            .replace("{name}", target.name())
    }

    /// Run a git subcommand inside `repo`, with the configured identity.
    fn git(&self, repo: &Path, args: &[&str]) -> Result<String, AdapterError> {
        let mut full: Vec<String> = Vec::with_capacity(args.len() + 4);
        if let Some(author) = &self.author {
            full.push("-c".to_owned());
            full.push(format!("user.name={}", author.name));
            full.push("-c".to_owned());
            full.push(format!("user.email={}", author.email));
        }
        full.extend(args.iter().map(|a| (*a).to_owned()));
        command::run(&self.program, &full, Some(repo))
    }

    fn head_resolves(&self, repo: &Path) -> bool {
        self.git(repo, &["rev-parse", "--verify", "--quiet", "HEAD"])
            .is_ok()
    }
}

impl VersionControl for GitCli {
    fn check_available(&self) -> Result<(), SyncError> {
        command::run(&self.program, ["--version"], None)
            .map(|_| ())
            .map_err(|e| SyncError::PrerequisiteMissing {
                tool: self.program.clone(),
                detail: e.to_string(),
                hint: "install git and make sure it is on PATH".to_owned(),
            })
    }

    fn clone_shallow(&self, target: &RepositoryTarget, dest: &Path) -> Result<(), AdapterError> {
        let url = self.clone_url_for(target);
        let args = [
            OsStr::new("clone"),
            OsStr::new("--depth"),
            OsStr::new("1"),
            OsStr::new(&url),
            dest.as_os_str(),
        ];
        command::run(&self.program, args, None)?;
        Ok(())
    }

    fn is_empty(&self, repo: &Path) -> bool {
        if self.head_resolves(repo) {
            return false;
        }
        // HEAD can also be unborn when the remote's default branch points
        // nowhere; only call it empty if the remote has no branches at all.
        match self.git(repo, &["ls-remote", "--heads", "origin"]) {
            Ok(heads) => heads.trim().is_empty(),
            Err(e) => {
                tracing::debug!("ls-remote failed in {}: {e}", repo.display());
                true
            }
        }
    }

    fn create_branch(
        &self,
        repo: &Path,
        branch: &BranchName,
        base: &str,
    ) -> Result<(), AdapterError> {
        if self.is_empty(repo) {
            let head = format!("refs/heads/{base}");
            self.git(repo, &["symbolic-ref", "HEAD", &head])?;
            return Ok(());
        }

        let remote_ref = format!("refs/remotes/origin/{base}");
        let refspec = format!("+refs/heads/{base}:{remote_ref}");
        self.git(repo, &["fetch", "--depth", "1", "origin", &refspec])?;
        self.git(repo, &["checkout", "-b", branch.as_str(), &remote_ref])?;
        Ok(())
    }

    fn has_changes(&self, repo: &Path) -> Result<bool, AdapterError> {
        if self.is_empty(repo) {
            return Ok(true);
        }
        let status = self.git(repo, &["status", "--porcelain", "--untracked-files=all"])?;
        Ok(!status.trim().is_empty())
    }

    fn commit_and_push(&self, repo: &Path, message: &str) -> Result<(), AdapterError> {
        self.git(repo, &["add", "-A"])?;
        self.git(repo, &["commit", "-m", message])?;
        self.git(repo, &["push", "origin", "HEAD"])?;
        Ok(())
    }

    fn merge(&self, repo: &Path, source: &BranchName, target: &str) -> Result<(), AdapterError> {
        let remote_ref = format!("refs/remotes/origin/{target}");
        self.git(repo, &["checkout", "-B", target, &remote_ref])?;
        self.git(repo, &["merge", "--no-edit", source.as_str()])?;
        self.git(repo, &["push", "origin", target])?;

        // The sync branch has served its purpose once merged.
        if let Err(e) = self.git(repo, &["push", "origin", "--delete", source.as_str()]) {
            tracing::warn!("could not delete remote branch {source}: {e}");
        }
        Ok(())
    }
}
