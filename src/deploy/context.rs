//! Deploy context: everything the pipeline needs, resolved once at startup.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, WorkspaceError};
use crate::git;
use crate::process::CommandRunner;
use crate::svn::{self, Credentials};

/// Default scratch root for the SVN working copy and the archive export
pub const DEFAULT_SCRATCH_ROOT: &str = "/tmp/wp-deploy";

/// Deployment mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployMode {
    /// Export the tagged tree to trunk and tag it
    FullRelease {
        /// Git tag to export, also the SVN tag name
        version: String,
    },
    /// Only refresh readme.txt and the assets directory
    ReadmeOnly,
}

impl DeployMode {
    /// Commit message for this mode
    pub fn commit_message(&self) -> String {
        match self {
            DeployMode::FullRelease { version } => format!(
                "Update plugin to version {version} with NextgenThemes WordPress Plugin Deploy"
            ),
            DeployMode::ReadmeOnly => {
                "Update readme and assets with NextgenThemes WordPress Plugin Deploy".to_string()
            }
        }
    }

    /// External tools this mode invokes
    pub fn required_tools(&self) -> &'static [&'static str] {
        match self {
            DeployMode::FullRelease { .. } => &["git", "svn", "rsync", "tar"],
            DeployMode::ReadmeOnly => &["git", "svn", "rsync"],
        }
    }
}

/// Resolved command line options, before repository discovery
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Absolute plugin source directory
    pub plugin_dir: PathBuf,
    /// Deployment mode
    pub mode: DeployMode,
    /// Extra directories to mirror into trunk, in order
    pub build_dirs: Vec<String>,
    /// Commit credentials
    pub credentials: Option<Credentials>,
    /// Skip the commit
    pub dry_run: bool,
    /// Root of the scratch workspace
    pub scratch_root: PathBuf,
}

/// The context record of a deploy run. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct DeployContext {
    /// WordPress.org plugin slug
    pub slug: String,
    /// Absolute plugin source directory
    pub plugin_dir: PathBuf,
    /// Git top-level directory
    pub vcs_root_dir: PathBuf,
    /// `plugin_dir` relative to `vcs_root_dir`; empty at the top level
    pub subdir: String,
    /// Deployment mode
    pub mode: DeployMode,
    /// Extra directories to mirror into trunk, in order
    pub build_dirs: Vec<String>,
    /// Commit credentials
    pub credentials: Option<Credentials>,
    /// Skip the commit
    pub dry_run: bool,
    /// SVN repository URL
    pub svn_url: String,
    /// Root of the scratch workspace, wiped at the start of each run
    pub scratch_dir: PathBuf,
    /// SVN working copy
    pub svn_dir: PathBuf,
    /// Target of the git archive export
    pub export_dir: PathBuf,
}

/// Final path segment of the plugin directory
pub fn slug_for(plugin_dir: &Path) -> std::result::Result<String, WorkspaceError> {
    plugin_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| WorkspaceError::NoSlug {
            path: plugin_dir.to_path_buf(),
        })
}

/// Build dirs are joined onto the plugin directory and must stay inside it
fn check_build_dir(name: &str) -> std::result::Result<(), WorkspaceError> {
    let escapes = Path::new(name).components().any(|c| {
        matches!(
            c,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if escapes {
        return Err(WorkspaceError::InvalidBuildDir {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Reject a scratch root whose wipe would reach any of `protected`
fn check_scratch_root(
    scratch: &Path,
    protected: &[&Path],
) -> std::result::Result<(), WorkspaceError> {
    let refuse = |dir: &Path| WorkspaceError::UnsafeScratchRoot {
        scratch: scratch.to_path_buf(),
        protected: dir.to_path_buf(),
    };

    if scratch.parent().is_none() {
        return Err(refuse(scratch));
    }

    // symlinked spellings of the same directory
    let resolved_scratch = scratch.canonicalize().ok();
    for dir in protected {
        if dir.starts_with(scratch) {
            return Err(refuse(dir));
        }
        if let (Some(resolved_scratch), Ok(resolved_dir)) = (&resolved_scratch, dir.canonicalize())
            && resolved_dir.starts_with(resolved_scratch)
        {
            return Err(refuse(dir));
        }
    }
    Ok(())
}

impl DeployContext {
    /// Assemble the context from already-known repository facts
    pub fn new(options: DeployOptions, vcs_root_dir: PathBuf, subdir: String) -> Result<Self> {
        let slug = slug_for(&options.plugin_dir)?;
        for build_dir in &options.build_dirs {
            check_build_dir(build_dir)?;
        }
        let scratch_dir = options.scratch_root;
        check_scratch_root(&scratch_dir, &[&options.plugin_dir, &vcs_root_dir])?;
        Ok(Self {
            svn_url: svn::repository_url(&slug),
            svn_dir: scratch_dir.join(format!("svn-{slug}")),
            export_dir: scratch_dir.join(format!("git-archive-{slug}")),
            scratch_dir,
            slug,
            plugin_dir: options.plugin_dir,
            vcs_root_dir,
            subdir,
            mode: options.mode,
            build_dirs: options.build_dirs,
            credentials: options.credentials,
            dry_run: options.dry_run,
        })
    }

    /// Discover the git repository around the plugin directory and build the context
    pub async fn discover<R: CommandRunner>(options: DeployOptions, runner: &R) -> Result<Self> {
        if !options.plugin_dir.is_dir() {
            return Err(WorkspaceError::PluginDirNotFound {
                path: options.plugin_dir,
            }
            .into());
        }

        let vcs_root_dir = git::toplevel(runner, &options.plugin_dir).await?;
        let subdir = git::relative_subdir(&options.plugin_dir, &vcs_root_dir)?;
        log::info!(
            "plugin {} at {:?} in repository {}",
            options.plugin_dir.display(),
            subdir,
            vcs_root_dir.display()
        );
        Self::new(options, vcs_root_dir, subdir)
    }

    /// Directories removed at the start of a run.
    ///
    /// The built-in scratch root belongs to this tool and is wiped whole. A
    /// configured root may hold other data, so only this plugin's working copy
    /// and export are removed from it.
    pub fn wipe_targets(&self) -> Vec<&Path> {
        if self.scratch_dir == Path::new(DEFAULT_SCRATCH_ROOT) {
            vec![self.scratch_dir.as_path()]
        } else {
            vec![self.svn_dir.as_path(), self.export_dir.as_path()]
        }
    }

    /// Version being released, `None` in readme-only mode
    pub fn version(&self) -> Option<&str> {
        match &self.mode {
            DeployMode::FullRelease { version } => Some(version),
            DeployMode::ReadmeOnly => None,
        }
    }
}

/// Register the plugin directory as a git `safe.directory` when running under CI.
///
/// CI runners check out the repository as a different user than the one the
/// job runs as, and git refuses to operate on it otherwise.
pub async fn normalize_environment<R: CommandRunner>(
    runner: &R,
    plugin_dir: &Path,
    in_ci: bool,
) -> Result<()> {
    if in_ci {
        runner.run(&git::add_safe_directory(plugin_dir)).await?;
    }
    Ok(())
}
