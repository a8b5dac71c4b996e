pub mod repos;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};

use agentspack_core::{settings, SyncSettings};

/// Load settings from `--config` when given, otherwise from the usual
/// lookup locations.
pub(crate) fn load_settings(config: Option<&Path>) -> Result<SyncSettings> {
    if let Some(path) = config {
        return settings::load_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()));
    }
    let cwd = std::env::current_dir().context("could not determine working directory")?;
    settings::resolve_at(&cwd, dirs::home_dir().as_deref()).context("failed to load settings")
}
