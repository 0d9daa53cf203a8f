//! Command line argument parsing and validation.
//!
//! Flags follow the `--name=value` convention. Empty values count as absent,
//! so `--svn-user=` behaves the same as leaving the flag out.

use std::path::PathBuf;

use clap::Parser;
use path_absolutize::Absolutize;

use crate::deploy::{DEFAULT_SCRATCH_ROOT, DeployMode, DeployOptions};
use crate::error::{CliError, Result};
use crate::svn::Credentials;

/// Deploy a WordPress plugin from a git repository to the WordPress.org plugin directory
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wp-plugin-deploy",
    disable_version_flag = true,
    about = "Deploy a WordPress plugin from git to the WordPress.org plugin SVN repository",
    long_about = "Deploy a WordPress plugin from git to the WordPress.org plugin SVN repository.

Usage:
  wp-plugin-deploy --version=1.2.3
  wp-plugin-deploy --version=1.2.3 --build-dirs=build,vendor --dry-run
  wp-plugin-deploy --readme-and-assets-only --workdir=plugins/my-plugin"
)]
pub struct Args {
    /// Echo every command and its output
    #[arg(long)]
    pub verbose: bool,

    /// Plugin directory (defaults to the current directory)
    #[arg(long, value_name = "PATH")]
    pub workdir: Option<PathBuf>,

    /// WordPress.org SVN username
    #[arg(long, env = "SVN_USERNAME", value_name = "USER")]
    pub svn_user: Option<String>,

    /// WordPress.org SVN password
    #[arg(long, env = "SVN_PASSWORD", hide_env_values = true, value_name = "PASS")]
    pub svn_pass: Option<String>,

    /// Comma separated directories mirrored into trunk after the git export
    #[arg(long, value_name = "DIRS")]
    pub build_dirs: Option<String>,

    /// Git tag to release; becomes the SVN tag
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Only update readme.txt and the assets directory
    #[arg(long)]
    pub readme_and_assets_only: bool,

    /// Stage everything but skip the commit
    #[arg(long)]
    pub dry_run: bool,

    /// Scratch directory for the SVN checkout and git export
    #[arg(
        long,
        env = "WP_DEPLOY_TMP_DIR",
        default_value = DEFAULT_SCRATCH_ROOT,
        value_name = "PATH"
    )]
    pub tmp_dir: PathBuf,
}

/// `None` for a missing or empty flag value
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Split a comma separated list: entries trimmed, empties and repeats dropped,
/// first-seen order kept.
pub fn parse_comma_list(input: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|seen| seen == item) {
            items.push(item.to_string());
        }
    }
    items
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check flags that are only required in some modes
    pub fn validate(&self) -> std::result::Result<(), CliError> {
        if !self.readme_and_assets_only && non_empty(&self.version).is_none() {
            return Err(CliError::MissingArgument {
                argument: "version".to_string(),
            });
        }
        if self.tmp_dir.as_os_str().is_empty() {
            return Err(CliError::InvalidArguments {
                reason: "--tmp-dir must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Deployment mode selected by the flags
    pub fn mode(&self) -> std::result::Result<DeployMode, CliError> {
        self.validate()?;
        match non_empty(&self.version) {
            Some(version) if !self.readme_and_assets_only => Ok(DeployMode::FullRelease {
                version: version.to_string(),
            }),
            _ => Ok(DeployMode::ReadmeOnly),
        }
    }

    /// Absolute plugin directory: `--workdir` resolved against the current directory
    pub fn plugin_dir(&self) -> Result<PathBuf> {
        let workdir = self
            .workdir
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        Ok(workdir.absolutize()?.into_owned())
    }

    /// Commit credentials, only when both halves are present
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.svn_user.clone(), self.svn_pass.clone())
    }

    /// True when only one of username and password was supplied
    pub fn has_partial_credentials(&self) -> bool {
        non_empty(&self.svn_user).is_some() != non_empty(&self.svn_pass).is_some()
    }

    /// Resolve everything the deploy needs before touching git
    pub fn deploy_options(&self) -> Result<DeployOptions> {
        let mode = self.mode()?;
        let scratch_root = self.tmp_dir.absolutize()?.into_owned();
        Ok(DeployOptions {
            plugin_dir: self.plugin_dir()?,
            mode,
            build_dirs: non_empty(&self.build_dirs)
                .map(parse_comma_list)
                .unwrap_or_default(),
            credentials: self.credentials(),
            dry_run: self.dry_run,
            scratch_root,
        })
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, false),
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }
}
