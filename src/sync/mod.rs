//! Directory mirroring with rsync.
//!
//! All mirrors are recursive and checksum-compared (`-rc`), so files with an
//! unchanged mtime but different content are still copied.

use std::ffi::OsString;
use std::path::Path;

use crate::process::CommandLine;

/// What a mirror removes from the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prune {
    /// Destination entries missing from the source (`--delete`)
    Deleted,
    /// Also entries excluded from the transfer (`--delete --delete-excluded`)
    DeletedAndExcluded,
}

fn with_trailing_slash(path: &Path) -> OsString {
    let mut s = path.as_os_str().to_os_string();
    if !s.to_string_lossy().ends_with('/') {
        s.push("/");
    }
    s
}

fn rsync(source: OsString, dest: OsString, prune: Prune) -> CommandLine {
    let cmd = CommandLine::new("rsync")
        .arg("-rc")
        .arg(source)
        .arg(dest)
        .arg("--delete");
    match prune {
        Prune::Deleted => cmd,
        Prune::DeletedAndExcluded => cmd.arg("--delete-excluded"),
    }
}

/// Make `dest` an exact copy of the contents of `source`
pub fn mirror_contents(source: &Path, dest: &Path, prune: Prune) -> CommandLine {
    rsync(with_trailing_slash(source), dest.as_os_str().to_os_string(), prune)
}

/// Mirror the directory `source` itself into `dest_parent/<name>`.
///
/// Deletion only reaches inside the copied directory; siblings already in
/// `dest_parent` are left alone.
pub fn mirror_into(source: &Path, dest_parent: &Path) -> CommandLine {
    // a trailing slash would make rsync copy the contents instead of the directory
    let source = source.components().as_path().as_os_str().to_os_string();
    rsync(source, with_trailing_slash(dest_parent), Prune::Deleted)
}
