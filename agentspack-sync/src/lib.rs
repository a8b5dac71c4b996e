//! # agentspack-sync
//!
//! Distributes a generated agent-configuration tree to a list of remote
//! repositories.
//!
//! Build an [`Orchestrator`] over a [`VersionControl`] and a [`Hosting`]
//! adapter ([`GitCli`] and [`GhCli`] in production, in-memory fakes in
//! tests) and call [`Orchestrator::run`] with the manifest path. The
//! returned [`SyncReport`] holds one [`SyncOutcome`] per listed repository.

mod command;
pub mod error;
pub mod hosting;
pub mod orchestrator;
pub mod overlay;
pub mod report;
pub mod vcs;

pub use error::{AdapterError, Stage, StageError, SyncError};
pub use hosting::{GhCli, Hosting};
pub use orchestrator::{Orchestrator, SyncOptions};
pub use overlay::{overlay, OverlayStats};
pub use report::{OutcomeKind, SyncOutcome, SyncReport, SyncSummary};
pub use vcs::{GitCli, VersionControl};
