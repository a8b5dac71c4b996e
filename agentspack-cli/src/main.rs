//! agentspack: push generated AI agent files to many repositories.
//!
//! # Usage
//!
//! ```text
//! agentspack sync [--output DIR] [--manifest FILE] [--target-branch B]
//!                 [--mode review-request|merge] [--jobs N] [--config FILE] [--json]
//! agentspack repos [--manifest FILE] [--config FILE]
//! ```

mod commands;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use agentspack_core::ApplyMode;
use commands::{repos::ReposArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "agentspack",
    version,
    about = "Sync generated AI agent configuration into many repositories",
    long_about = None,
)]
struct Cli {
    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Overlay the generated output onto every listed repository.
    Sync(SyncArgs),

    /// List the repositories a sync would touch.
    Repos(ReposArgs),
}

// ---------------------------------------------------------------------------
// Shared ApplyMode argument, parsed by clap and converted to the core type
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `ApplyMode` from CLI args.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyModeArg(pub ApplyMode);

impl FromStr for ApplyModeArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "review-request" | "create-review-request" | "pr" => {
                Ok(Self(ApplyMode::ReviewRequest))
            }
            "merge" | "merge-directly" => Ok(Self(ApplyMode::Merge)),
            other => Err(format!(
                "unknown apply mode '{other}'; expected: review-request, merge"
            )),
        }
    }
}

impl fmt::Display for ApplyModeArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ApplyModeArg> for ApplyMode {
    fn from(m: ApplyModeArg) -> Self {
        m.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().default_filter_or(default);
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Repos(args) => args.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn apply_mode_arg_accepts_aliases() {
        for (input, expected) in [
            ("review-request", ApplyMode::ReviewRequest),
            ("PR", ApplyMode::ReviewRequest),
            ("create-review-request", ApplyMode::ReviewRequest),
            ("merge", ApplyMode::Merge),
            ("merge-directly", ApplyMode::Merge),
        ] {
            let parsed: ApplyModeArg = input.parse().unwrap();
            assert_eq!(ApplyMode::from(parsed), expected, "{input}");
        }
    }

    #[test]
    fn apply_mode_arg_rejects_unknown() {
        let err = "squash".parse::<ApplyModeArg>().unwrap_err();
        assert!(err.contains("unknown apply mode 'squash'"));
    }

    #[test]
    fn verbose_flag_counts_and_is_global() {
        let cli = Cli::try_parse_from(["agentspack", "repos", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
