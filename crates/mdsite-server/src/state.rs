//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use mdsite_content::SnapshotCache;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Snapshot cache serving the current site.
    pub(crate) cache: Arc<SnapshotCache>,
    /// Content root for raw asset serving.
    pub(crate) content_root: PathBuf,
    /// Enable verbose output (show warnings).
    pub(crate) verbose: bool,
}
