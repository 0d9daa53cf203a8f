//! Subversion commands against the WordPress.org plugin repository.
//!
//! Builders return [`CommandLine`]s; nothing in here spawns a process.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::process::CommandLine;

/// Root of the WordPress.org plugin repository
pub const REPOSITORY_ROOT: &str = "https://plugins.svn.wordpress.org";

/// `svn:mime-type` property name
pub const MIME_TYPE_PROPERTY: &str = "svn:mime-type";

/// Repository URL for a plugin slug
pub fn repository_url(slug: &str) -> String {
    format!("{REPOSITORY_ROOT}/{slug}/")
}

/// Sparse checkout depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Direct children only, no file bodies below them
    Immediates,
    /// Full recursive depth
    Infinity,
}

impl Depth {
    fn as_str(self) -> &'static str {
        match self {
            Depth::Immediates => "immediates",
            Depth::Infinity => "infinity",
        }
    }
}

/// Commit credentials. Only constructed when both halves are present.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Pair a username and password; a missing or empty half yields `None`
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Self { username, password })
            }
            _ => None,
        }
    }

    /// Username
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// `svn checkout --depth <depth> <url> <dir>`
pub fn checkout(url: &str, dir: &Path, depth: Depth) -> CommandLine {
    CommandLine::new("svn")
        .arg("checkout")
        .arg("--depth")
        .arg(depth.as_str())
        .arg(url)
        .arg(dir)
}

/// `svn update --set-depth <depth> <path>`, run inside the working copy
pub fn set_depth(working_copy: &Path, depth: Depth, path: impl AsRef<Path>) -> CommandLine {
    CommandLine::new("svn")
        .arg("update")
        .arg("--set-depth")
        .arg(depth.as_str())
        .arg(path.as_ref())
        .current_dir(working_copy)
}

/// `svn add . --force --quiet`: schedules every unversioned path, recursing
/// into directories that are already under version control
pub fn add_all(working_copy: &Path) -> CommandLine {
    CommandLine::new("svn")
        .args(["add", ".", "--force", "--quiet"])
        .current_dir(working_copy)
}

/// `svn status`
pub fn status(working_copy: &Path) -> CommandLine {
    CommandLine::new("svn").arg("status").current_dir(working_copy)
}

/// `svn rm <path>@ --quiet`
///
/// The trailing `@` ends the path so svn does not read a peg revision out of
/// file names that contain `@` themselves.
pub fn remove(working_copy: &Path, path: &str) -> CommandLine {
    CommandLine::new("svn")
        .arg("rm")
        .arg(format!("{path}@"))
        .arg("--quiet")
        .current_dir(working_copy)
}

/// `svn cp <from> <to>` inside the working copy
pub fn copy(working_copy: &Path, from: &str, to: &str) -> CommandLine {
    CommandLine::new("svn")
        .arg("cp")
        .arg(from)
        .arg(to)
        .current_dir(working_copy)
}

/// `svn propset svn:mime-type <mime> <files...>`
pub fn set_mime_type(working_copy: &Path, mime: &str, files: &[PathBuf]) -> CommandLine {
    CommandLine::new("svn")
        .arg("propset")
        .arg(MIME_TYPE_PROPERTY)
        .arg(mime)
        .args(files)
        .current_dir(working_copy)
}

/// `svn commit -m <message>`, non-interactive when credentials are given
pub fn commit(working_copy: &Path, message: &str, credentials: Option<&Credentials>) -> CommandLine {
    let cmd = CommandLine::new("svn")
        .arg("commit")
        .arg("-m")
        .arg(message)
        .current_dir(working_copy);

    match credentials {
        Some(credentials) => cmd
            .args(["--no-auth-cache", "--non-interactive", "--username"])
            .arg(&credentials.username)
            .arg("--password")
            .secret_arg(&credentials.password),
        None => cmd,
    }
}

/// Paths `svn status` reports as missing (`!`): tracked but gone from disk
pub fn missing_paths(status: &str) -> Vec<String> {
    status
        .lines()
        .filter_map(|line| line.strip_prefix('!'))
        .map(|rest| rest.trim_start_matches(' ').trim_end_matches('\r'))
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}
