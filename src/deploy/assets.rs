//! MIME types for plugin directory assets.
//!
//! Without an explicit `svn:mime-type` the plugin directory serves banners and
//! screenshots as `application/octet-stream`, and browsers download them
//! instead of rendering them.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::Result;
use crate::process::CommandRunner;
use crate::svn;

use super::Deployer;

/// Asset extensions and the MIME type each one gets
pub const MIME_TYPES: [(&str, &str); 4] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
];

/// Entries directly under `<working_copy>/assets` ending in `.<extension>`,
/// relative to the working copy and sorted.
pub fn asset_files(working_copy: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let assets = working_copy.join("assets");
    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&assets.to_string_lossy()),
        extension
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(&pattern, options).map_err(std::io::Error::other)? {
        let path = entry.map_err(glob::GlobError::into_error)?;
        if let Ok(relative) = path.strip_prefix(working_copy) {
            files.push(relative.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

impl<R: CommandRunner> Deployer<'_, R> {
    /// One `svn propset` per extension that has matching files
    pub(super) async fn fix_asset_mime_types(&self) -> Result<()> {
        let working_copy = &self.ctx.svn_dir;
        for (extension, mime) in MIME_TYPES {
            let files = asset_files(working_copy, extension)?;
            if files.is_empty() {
                continue;
            }
            log::debug!("{} *.{extension} assets -> {mime}", files.len());
            self.runner
                .run(&svn::set_mime_type(working_copy, mime, &files))
                .await?;
        }
        Ok(())
    }
}
