//! `agentspack sync`: overlay the generated output onto every listed
//! repository and apply it through a review request or a direct merge.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use agentspack_core::{BranchName, SyncSettings};
use agentspack_sync::{
    GhCli, GitCli, Orchestrator, OutcomeKind, SyncOptions, SyncOutcome, SyncReport, SyncSummary,
};

use crate::ApplyModeArg;

/// Arguments for `agentspack sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Generated output directory to copy into each repository.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Repository list, one `owner/name` per line.
    #[arg(long, short)]
    pub manifest: Option<PathBuf>,

    /// Branch the changes are applied to.
    #[arg(long)]
    pub target_branch: Option<String>,

    /// `review-request` opens a pull request, `merge` merges directly.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ApplyModeArg>,

    /// Repositories processed at once.
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Settings file to use instead of the default lookup.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let mut settings = super::load_settings(self.config.as_deref())?;
        self.apply_overrides(&mut settings);
        settings.validate().context("invalid sync settings")?;
        log::debug!("resolved settings: {settings:?}");

        let author = settings.commit_author.clone();
        let vcs = GitCli::new(settings.clone_url.clone()).with_author(author);
        let hosting = GhCli::new(settings.review_title.clone(), settings.review_body.clone());
        let options = SyncOptions::from_settings(&settings);

        let report = Orchestrator::new(&vcs, &hosting, options)
            .run(&settings.manifest)
            .context("sync aborted")?;

        if self.json {
            print_json(&report)?;
        } else if report.is_empty() {
            println!("No repositories found in {}", settings.manifest.display());
            return Ok(());
        } else {
            print_report(&report, &settings);
        }

        let summary = report.summary();
        if summary.failed > 0 {
            bail!(
                "{} of {} repositories failed to sync",
                summary.failed,
                report.outcomes.len()
            );
        }
        Ok(())
    }

    fn apply_overrides(&self, settings: &mut SyncSettings) {
        if let Some(output) = &self.output {
            settings.output_dir = output.clone();
        }
        if let Some(manifest) = &self.manifest {
            settings.manifest = manifest.clone();
        }
        if let Some(branch) = &self.target_branch {
            settings.target_branch = branch.clone();
        }
        if let Some(mode) = self.mode {
            settings.apply_mode = mode.into();
        }
        if let Some(jobs) = self.jobs {
            settings.jobs = jobs;
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_report(report: &SyncReport, settings: &SyncSettings) {
    println!(
        "Synced {} repositories via {} ({} into {})",
        report.outcomes.len(),
        report.branch.as_str().bold(),
        settings.apply_mode,
        settings.target_branch
    );
    for outcome in &report.outcomes {
        println!(
            "  {} {}: {}",
            indicator(outcome.kind),
            outcome.target,
            outcome_line(outcome, &settings.target_branch)
        );
    }

    let s = report.summary();
    println!(
        "{} updated, {} skipped, {} failed",
        s.updated.to_string().green(),
        s.skipped,
        if s.failed > 0 {
            s.failed.to_string().red().bold()
        } else {
            s.failed.to_string().normal()
        }
    );
}

fn outcome_line(outcome: &SyncOutcome, target_branch: &str) -> String {
    match outcome.kind {
        OutcomeKind::ReviewRequested => format!(
            "PR created: {}",
            outcome.review_url.as_deref().unwrap_or("(no URL)")
        ),
        OutcomeKind::Merged => format!("merged to {target_branch}"),
        OutcomeKind::Initialized => outcome.message.clone(),
        OutcomeKind::NoChanges => "skipped (no changes)".to_string(),
        OutcomeKind::Failed => format!("failed: {}", outcome.message),
    }
}

fn indicator(kind: OutcomeKind) -> String {
    match kind {
        OutcomeKind::ReviewRequested | OutcomeKind::Merged | OutcomeKind::Initialized => {
            "✓".green().bold().to_string()
        }
        OutcomeKind::NoChanges => "·".bright_black().to_string(),
        OutcomeKind::Failed => "✗".red().bold().to_string(),
    }
}

#[derive(Serialize)]
struct SyncReportJson<'a> {
    summary: SyncSummary,
    branch: &'a BranchName,
    started_at: DateTime<Utc>,
    outcomes: &'a [SyncOutcome],
}

fn print_json(report: &SyncReport) -> Result<()> {
    let payload = SyncReportJson {
        summary: report.summary(),
        branch: &report.branch,
        started_at: report.started_at,
        outcomes: &report.outcomes,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
    );
    Ok(())
}
