//! Deploy phases, in execution order.

use crate::error::{Result, WorkspaceError};
use crate::git;
use crate::process::CommandRunner;
use crate::readme::{self, README_FILE};
use crate::svn::{self, Depth};
use crate::sync::{self, Prune};

use super::{DeployOutcome, Deployer};

/// Plugin directory holding banners, icons and screenshots for WordPress.org
pub const ASSETS_SOURCE_DIR: &str = ".wordpress-org";

impl<R: CommandRunner> Deployer<'_, R> {
    /// Wipe the previous run, then sparse-checkout the plugin repository with
    /// `assets` and `trunk` at full depth
    pub(super) async fn prepare_workspace(&self) -> Result<()> {
        let ctx = self.ctx;

        for dir in ctx.wipe_targets() {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => log::debug!("removed {}", dir.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        tokio::fs::create_dir_all(&ctx.scratch_dir).await?;

        // Tags stay shallow; the release tag is created with svn cp below
        let _ = self.output.progress("Checking out wp.org repository...");
        self.runner
            .run(&svn::checkout(&ctx.svn_url, &ctx.svn_dir, Depth::Immediates))
            .await?;

        for subtree in ["assets", "trunk"] {
            self.runner
                .run(&svn::set_depth(&ctx.svn_dir, Depth::Infinity, subtree))
                .await?;
        }
        Ok(())
    }

    /// Copy readme.txt into trunk and into the tag named by its stable tag
    pub(super) async fn stage_readme(&self) -> Result<()> {
        let ctx = self.ctx;
        let readme = ctx.plugin_dir.join(README_FILE);
        let stable_tag = readme::stable_tag(&readme).await?;
        let _ = self.output.info(&format!("Detected Stable tag: {stable_tag}"));

        let tag_dir = ctx.svn_dir.join("tags").join(&stable_tag);
        self.runner
            .run(&svn::set_depth(&ctx.svn_dir, Depth::Immediates, &tag_dir))
            .await?;

        tokio::fs::copy(&readme, tag_dir.join(README_FILE)).await?;
        tokio::fs::copy(&readme, ctx.svn_dir.join("trunk").join(README_FILE)).await?;
        Ok(())
    }

    /// Export the tagged tree into trunk, then layer the build dirs on top
    pub(super) async fn stage_release(&self, version: &str) -> Result<()> {
        let ctx = self.ctx;
        let trunk = ctx.svn_dir.join("trunk");

        tokio::fs::create_dir_all(&ctx.export_dir).await?;
        self.runner
            .pipe(
                &git::archive(&ctx.vcs_root_dir, version, &ctx.subdir),
                &git::extract(&ctx.export_dir),
            )
            .await?;
        self.runner
            .run(&sync::mirror_contents(
                &ctx.export_dir,
                &trunk,
                Prune::DeletedAndExcluded,
            ))
            .await?;

        for build_dir in &ctx.build_dirs {
            let source = ctx.plugin_dir.join(build_dir);
            if !tokio::fs::try_exists(&source).await? {
                return Err(WorkspaceError::MissingBuildDir { path: source }.into());
            }
            self.runner.run(&sync::mirror_into(&source, &trunk)).await?;
        }
        Ok(())
    }

    /// Mirror `.wordpress-org/` into the repository's `assets`
    pub(super) async fn stage_metadata(&self) -> Result<()> {
        let ctx = self.ctx;
        self.runner
            .run(&sync::mirror_contents(
                &ctx.plugin_dir.join(ASSETS_SOURCE_DIR),
                &ctx.svn_dir.join("assets"),
                Prune::Deleted,
            ))
            .await?;
        Ok(())
    }

    /// Schedule additions and deletions; in a full release also copy trunk to
    /// the new tag so both land in a single commit
    pub(super) async fn reconcile_changes(&self) -> Result<()> {
        let ctx = self.ctx;

        self.runner.run(&svn::add_all(&ctx.svn_dir)).await?;

        let status = self.runner.run(&svn::status(&ctx.svn_dir)).await?;
        for path in svn::missing_paths(&status) {
            self.runner.run(&svn::remove(&ctx.svn_dir, &path)).await?;
        }

        if let Some(version) = ctx.version() {
            let _ = self.output.progress("Copying tag...");
            self.runner
                .run(&svn::copy(&ctx.svn_dir, "trunk", &format!("tags/{version}")))
                .await?;
        }
        Ok(())
    }

    /// Show pending changes and commit them unless this is a dry run
    pub(super) async fn publish(&self) -> Result<DeployOutcome> {
        let ctx = self.ctx;

        let status = self.runner.run(&svn::status(&ctx.svn_dir)).await?;
        // verbose runs already echoed the command output
        if !self.output.is_verbose() && !status.trim().is_empty() {
            let _ = self.output.println(status.trim_end());
        }

        if ctx.dry_run {
            let _ = self.output.progress("Dry run exit");
            return Ok(DeployOutcome::DryRun);
        }

        let _ = self.output.progress("Committing files...");
        self.runner
            .run(&svn::commit(
                &ctx.svn_dir,
                &ctx.mode.commit_message(),
                ctx.credentials.as_ref(),
            ))
            .await?;

        let _ = self.output.success("Plugin deployed!");
        Ok(DeployOutcome::Committed)
    }
}
