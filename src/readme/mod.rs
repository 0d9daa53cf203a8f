//! Plugin readme parsing.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tokio::io::AsyncReadExt;

use crate::error::{ReadmeError, Result};

/// File name of the plugin readme
pub const README_FILE: &str = "readme.txt";

/// Only the header is scanned; WordPress.org reads the stable tag from there too
const HEADER_BYTES: u64 = 4096;

static STABLE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([*+-]\s+)?Stable tag:[ ]*(?P<stable_tag>\S+)")
        .expect("stable tag regex is valid")
});

/// Extract the `Stable tag:` value from readme text
pub fn parse_stable_tag(text: &str) -> Option<&str> {
    STABLE_TAG_RE
        .captures(text)
        .and_then(|caps| caps.name("stable_tag"))
        .map(|m| m.as_str())
}

/// Read the stable tag from the header of the readme at `path`
pub async fn stable_tag(path: &Path) -> Result<String> {
    if !tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
    {
        return Err(ReadmeError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }

    let file = tokio::fs::File::open(path).await?;
    let mut header = Vec::with_capacity(HEADER_BYTES as usize);
    file.take(HEADER_BYTES).read_to_end(&mut header).await?;
    let text = String::from_utf8_lossy(&header);

    let tag = parse_stable_tag(&text).ok_or_else(|| ReadmeError::NoStableTag {
        path: path.to_path_buf(),
    })?;
    log::debug!("stable tag {tag} in {}", path.display());
    Ok(tag.to_string())
}
