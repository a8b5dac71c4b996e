//! `agentspack repos`: show what the manifest resolves to. Offline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use agentspack_core::{manifest, ParsedManifest};

/// Arguments for `agentspack repos`.
#[derive(Args, Debug)]
pub struct ReposArgs {
    /// Repository list, one `owner/name` per line.
    #[arg(long, short)]
    pub manifest: Option<PathBuf>,

    /// Settings file to use instead of the default lookup.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ReposArgs {
    pub fn run(self) -> Result<()> {
        let path = match self.manifest {
            Some(path) => path,
            None => super::load_settings(self.config.as_deref())?.manifest,
        };
        let parsed = manifest::load_detailed(&path)
            .with_context(|| format!("failed to read repository list {}", path.display()))?;

        print!("{}", render(&parsed));
        if parsed.targets.is_empty() {
            println!("No repositories found in {}", path.display());
        }
        Ok(())
    }
}

fn render(parsed: &ParsedManifest) -> String {
    let mut out = String::new();
    for target in &parsed.targets {
        out.push_str(&format!("{target}\n"));
    }
    for rejected in &parsed.rejected {
        out.push_str(&format!(
            "{} line {}: '{}' ignored ({})\n",
            "!".yellow().bold(),
            rejected.line,
            rejected.entry,
            rejected.reason
        ));
    }
    out.push_str(&format!(
        "{} repositories, {} ignored lines\n",
        parsed.targets.len(),
        parsed.rejected.len()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_lists_targets_then_rejections() {
        colored::control::set_override(false);
        let parsed = manifest::parse("acme/api\nbad line\nacme/web\n");
        let text = render(&parsed);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "acme/api");
        assert_eq!(lines[1], "acme/web");
        assert!(lines[2].starts_with("! line 2: 'bad line' ignored"));
        assert_eq!(lines[3], "2 repositories, 1 ignored lines");
    }
}
