//! Document API endpoint.
//!
//! Looks up documents by slug and returns the full processed record as JSON.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use mdsite_content::{DocRecord, find_doc_by_slug};

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /api/docs/ (landing document).
pub(crate) async fn get_root_doc(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    get_doc_impl(String::new(), &state)
}

/// Handle GET /api/docs/{slug}.
pub(crate) async fn get_doc(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    get_doc_impl(slug, &state)
}

/// Shared implementation for document lookup.
fn get_doc_impl(slug: String, state: &AppState) -> Result<Json<DocRecord>, ServerError> {
    let snapshot = state.cache.get()?;

    let segments: Vec<String> = slug
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();

    let doc = find_doc_by_slug(&snapshot.docs, &segments)
        .ok_or_else(|| ServerError::DocNotFound(slug.clone()))?;

    if state.verbose {
        tracing::debug!(slug = %slug, path = %doc.rel_path, "Serving document");
    }

    Ok(Json(doc.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdsite_content::{BuildOptions, CacheMode, NullSnapshotStore, SnapshotCache};

    fn state(root: &std::path::Path) -> AppState {
        AppState {
            cache: Arc::new(SnapshotCache::new(
                root.to_owned(),
                BuildOptions::default(),
                CacheMode::Live,
                Box::new(NullSnapshotStore),
            )),
            content_root: root.to_owned(),
            verbose: false,
        }
    }

    #[test]
    fn test_lookup_by_slug() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("guides")).unwrap();
        std::fs::write(dir.path().join("guides/intro.md"), "# Intro\n").unwrap();

        let Json(doc) = get_doc_impl("guides/intro".to_owned(), &state(dir.path())).unwrap();
        assert_eq!(doc.rel_path, "guides/intro.md");
        assert_eq!(doc.title, "Intro");
    }

    #[test]
    fn test_unknown_slug_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();

        let err = get_doc_impl("missing".to_owned(), &state(dir.path())).unwrap_err();
        assert!(matches!(err, ServerError::DocNotFound(_)));
    }
}
