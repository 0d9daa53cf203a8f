//! Git commands against the plugin's source repository.

use std::path::{Path, PathBuf};

use crate::error::{CommandError, Result, WorkspaceError};
use crate::process::{CommandLine, CommandRunner};

/// Environment variable GitHub Actions sets inside a workflow step
pub const CI_ENV: &str = "GITHUB_ACTION";

/// `git rev-parse --show-toplevel`, run from `dir`
pub fn show_toplevel(dir: &Path) -> CommandLine {
    CommandLine::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir)
}

/// `git config --global --add safe.directory <dir>`
pub fn add_safe_directory(dir: &Path) -> CommandLine {
    CommandLine::new("git")
        .args(["config", "--global", "--add", "safe.directory"])
        .arg(dir)
}

/// `git --git-dir=<root>/.git archive <version>:<subdir>`
///
/// The `<tag>:<path>` tree-ish scopes the archive to the plugin's subtree, so
/// its entries are relative to the plugin directory.
pub fn archive(repo_root: &Path, version: &str, subdir: &str) -> CommandLine {
    let mut git_dir = std::ffi::OsString::from("--git-dir=");
    git_dir.push(repo_root.join(".git"));
    CommandLine::new("git")
        .arg(git_dir)
        .arg("archive")
        .arg(format!("{version}:{subdir}"))
}

/// `tar x --directory=<dir>`, reading the archive from stdin
pub fn extract(into: &Path) -> CommandLine {
    let mut directory = std::ffi::OsString::from("--directory=");
    directory.push(into);
    CommandLine::new("tar").arg("x").arg(directory)
}

/// True when running inside a GitHub Actions job
pub fn running_in_ci() -> bool {
    std::env::var_os(CI_ENV).is_some_and(|value| !value.is_empty())
}

/// Query the repository top-level directory containing `dir`
pub async fn toplevel<R: CommandRunner>(runner: &R, dir: &Path) -> Result<PathBuf> {
    let cmd = show_toplevel(dir);
    let stdout = runner.run(&cmd).await?;
    let root = stdout.trim_end();
    if root.is_empty() {
        return Err(CommandError::EmptyOutput {
            command: cmd.to_string(),
        }
        .into());
    }
    Ok(PathBuf::from(root))
}

/// Path of `plugin_dir` relative to `root`, `/`-separated, without leading or
/// trailing separators. Empty when both are the same directory.
pub fn relative_subdir(
    plugin_dir: &Path,
    root: &Path,
) -> std::result::Result<String, WorkspaceError> {
    let outside = || WorkspaceError::OutsideRepository {
        plugin_dir: plugin_dir.to_path_buf(),
        root: root.to_path_buf(),
    };

    let relative = match plugin_dir.strip_prefix(root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => {
            // git reports the resolved path; the plugin dir may sit behind a symlink
            let dir = plugin_dir.canonicalize().map_err(|_| outside())?;
            let resolved_root = root.canonicalize().map_err(|_| outside())?;
            dir.strip_prefix(&resolved_root)
                .map_err(|_| outside())?
                .to_path_buf()
        }
    };

    let segments: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(segments.join("/").trim_matches('/').to_string())
}
