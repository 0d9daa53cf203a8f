//! Deployment orchestration.
//!
//! One linear sequence of external commands:
//!
//! 1. wipe the scratch root, sparse-checkout the SVN repository
//! 2. stage content (readme only, or the tagged git tree plus build dirs)
//! 3. mirror `.wordpress-org/` into `assets`
//! 4. schedule additions and deletions, copy trunk to the new tag
//! 5. fix asset MIME types
//! 6. print status and commit, unless this is a dry run
//!
//! Every command must succeed; the first failure ends the run.

mod assets;
mod context;
mod phases;

#[cfg(test)]
mod tests;

pub use assets::{MIME_TYPES, asset_files};
pub use context::{
    DEFAULT_SCRATCH_ROOT, DeployContext, DeployMode, DeployOptions, normalize_environment,
    slug_for,
};
pub use phases::ASSETS_SOURCE_DIR;

use crate::cli::OutputManager;
use crate::error::Result;
use crate::process::CommandRunner;

/// How a deploy run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    /// Changes were committed to the plugin repository
    Committed,
    /// Everything was staged but the commit was skipped
    DryRun,
}

/// Runs the deploy sequence for one context
pub struct Deployer<'a, R: CommandRunner> {
    ctx: &'a DeployContext,
    runner: &'a R,
    output: &'a OutputManager,
}

impl<'a, R: CommandRunner> Deployer<'a, R> {
    /// Create a deployer
    pub fn new(ctx: &'a DeployContext, runner: &'a R, output: &'a OutputManager) -> Self {
        Self {
            ctx,
            runner,
            output,
        }
    }

    /// Execute every phase in order
    pub async fn run(&self) -> Result<DeployOutcome> {
        self.prepare_workspace().await?;

        let _ = self.output.progress("Copying files...");
        match &self.ctx.mode {
            DeployMode::ReadmeOnly => self.stage_readme().await?,
            DeployMode::FullRelease { version } => self.stage_release(version).await?,
        }
        self.stage_metadata().await?;

        let _ = self.output.progress("Preparing files...");
        self.reconcile_changes().await?;
        self.fix_asset_mime_types().await?;

        self.publish().await
    }
}
