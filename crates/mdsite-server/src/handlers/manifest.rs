//! Manifest API endpoint.
//!
//! Serves the navigation tree and search index in one payload so the client
//! can boot with a single request.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use mdsite_content::{DocSearchEntry, DocTreeNode};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/manifest.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestResponse<'a> {
    /// Navigation tree.
    tree: &'a [DocTreeNode],
    /// Search index entries.
    search_entries: &'a [DocSearchEntry],
}

/// Handle GET /api/manifest.
pub(crate) async fn get_manifest(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let snapshot = state.cache.get()?;

    let body = serde_json::to_value(ManifestResponse {
        tree: &snapshot.tree,
        search_entries: &snapshot.search_entries,
    })
    .unwrap_or_default();

    Ok((
        [(
            header::CACHE_CONTROL,
            "public, max-age=300, stale-while-revalidate=604800",
        )],
        Json(body),
    ))
}
