//! Content root scanning and change fingerprinting.
//!
//! Walks the content root for markdown sources and computes the cheap
//! fingerprint the snapshot cache revalidates against: file count plus the
//! newest modification time, over every non-hidden file so that asset edits
//! invalidate too. Renames that keep both stable go undetected, which is an
//! accepted trade-off against hashing every file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};

use crate::ContentError;

/// Cheap change detector for a content root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fingerprint {
    /// Number of non-hidden files under the root.
    pub file_count: u64,

    /// Newest file mtime in milliseconds since the Unix epoch.
    pub max_mtime_ms: u64,
}

/// List all markdown documents under `root`, sorted by relative path.
///
/// Paths use forward slashes regardless of platform. Hidden files and
/// directories (leading dot) are skipped. A missing or empty root yields an
/// empty list.
pub fn scan_documents(root: &Path) -> Result<Vec<String>, ContentError> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut paths = Vec::new();
    walk(root, root, &mut |path| {
        if is_markdown_file(path) {
            paths.push(relative_slash_path(root, path));
        }
        Ok(())
    })?;
    paths.sort();
    Ok(paths)
}

/// Compute the [`Fingerprint`] of a content root.
///
/// Covers every non-hidden file, not just markdown: asset changes feed
/// rendered output (image dimensions) and must invalidate as well. A missing
/// root fingerprints as `(0, 0)`, matching an empty one.
pub fn compute_fingerprint(root: &Path) -> Result<Fingerprint, ContentError> {
    let mut fingerprint = Fingerprint::default();
    if !root.exists() {
        return Ok(fingerprint);
    }
    walk(root, root, &mut |path| {
        fingerprint.file_count += 1;
        let metadata = fs::metadata(path).map_err(|source| ContentError::Io {
            path: path.to_owned(),
            source,
        })?;
        if let Ok(modified) = metadata.modified() {
            let mtime_ms = modified
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
            fingerprint.max_mtime_ms = fingerprint.max_mtime_ms.max(mtime_ms);
        }
        Ok(())
    })?;
    Ok(fingerprint)
}

/// Read one document's raw text by content-relative path.
pub fn read_document(root: &Path, rel_path: &str) -> Result<String, ContentError> {
    let path = root.join(rel_path);
    fs::read_to_string(&path).map_err(|source| ContentError::Io { path, source })
}

/// Depth-first walk applying `visit` to every non-hidden file.
fn walk(
    root: &Path,
    dir: &Path,
    visit: &mut dyn FnMut(&Path) -> Result<(), ContentError>,
) -> Result<(), ContentError> {
    let entries = fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.to_owned(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let path = entry.path();
        if is_hidden(&path) {
            continue;
        }
        if path.is_dir() {
            walk(root, &path, visit)?;
        } else {
            visit(&path)?;
        }
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("mdx"))
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    let rel: PathBuf = path.strip_prefix(root).unwrap_or(path).to_owned();
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
