//! Asset API endpoint.
//!
//! Serves raw files from the content root with conditional-request support.
//! Two containment checks guard the content root: a textual segment check
//! (rejects `..`, absolute paths and backslashes with 400) and a
//! canonicalized prefix check that also catches symlinks pointing outside.

use std::fs;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /api/assets/{path}.
pub(crate) async fn get_asset(
    Path(path): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    validate_rel_path(&path)?;

    let full = state.content_root.join(&path);

    // Canonicalize both sides so symlinks cannot escape the content root.
    let root = fs::canonicalize(&state.content_root)
        .map_err(|_| ServerError::AssetNotFound(path.clone()))?;
    let resolved =
        fs::canonicalize(&full).map_err(|_| ServerError::AssetNotFound(path.clone()))?;
    if !resolved.starts_with(&root) {
        return Err(ServerError::AssetNotFound(path));
    }

    let metadata =
        fs::metadata(&resolved).map_err(|_| ServerError::AssetNotFound(path.clone()))?;
    if !metadata.is_file() {
        return Err(ServerError::AssetNotFound(path));
    }

    let etag = compute_etag(&metadata);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let content =
        fs::read(&resolved).map_err(|_| ServerError::AssetNotFound(path.clone()))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&path).to_owned()),
            (header::ETAG, etag),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, stale-while-revalidate=604800".to_owned(),
            ),
        ],
        Body::from(content),
    )
        .into_response())
}

/// Reject paths that escape the content root textually.
///
/// The canonicalization check catches anything this misses, but failing the
/// obvious cases early returns 400 instead of 404.
fn validate_rel_path(path: &str) -> Result<(), ServerError> {
    if path.starts_with('/') || path.contains('\\') {
        return Err(ServerError::InvalidPath(path.to_owned()));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(ServerError::InvalidPath(path.to_owned()));
    }
    Ok(())
}

/// Weak `ETag` from file size and mtime truncated to seconds.
fn compute_etag(metadata: &fs::Metadata) -> String {
    let size = metadata.len();
    let mtime_secs = metadata
        .modified()
        .ok()
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());
    format!(
        "W/\"{}-{}\"",
        hex::encode(size.to_be_bytes()),
        hex::encode(mtime_secs.to_be_bytes())
    )
}

/// Content type by extension allow-list.
fn content_type_for(path: &str) -> &'static str {
    let extension = FsPath::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "css" => "text/css; charset=utf-8",
        "js" => "text/javascript; charset=utf-8",
        "txt" | "md" | "mdx" => "text/plain; charset=utf-8",
        "html" => "text/html; charset=utf-8",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}
