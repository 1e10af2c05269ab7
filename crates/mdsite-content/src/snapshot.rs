//! Site snapshots and the fingerprint-keyed cache.
//!
//! A [`Snapshot`] is the fully processed site: every document rendered, plus
//! the navigation tree and search index derived from them. [`SnapshotCache`]
//! holds the current snapshot behind a fingerprint check so repeated access
//! is cheap and edits are picked up without restarts.
//!
//! # Persisted Format
//!
//! Snapshots persist as JSON with a reserved metadata key:
//!
//! ```json
//! {
//!     "docs": [...],
//!     "slugs": [["guides", "intro"]],
//!     "tree": [...],
//!     "searchEntries": [...],
//!     "__meta": {
//!         "createdAt": "2024-06-02T08:00:00Z",
//!         "schemaVersion": 3,
//!         "version": {"fileCount": 12, "maxMtimeMs": 1717315200000}
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ContentError;
use crate::document::{BuildOptions, DocRecord, build_document};
use crate::scanner::{Fingerprint, compute_fingerprint, read_document, scan_documents};
use crate::search::{DocSearchEntry, build_search_entries};
use crate::tree::{DocTreeNode, build_tree};

/// Bumped whenever the persisted snapshot layout changes, so stale files
/// from earlier builds are rebuilt instead of misread.
pub const SCHEMA_VERSION: u32 = 3;

/// Snapshot provenance, persisted under the `__meta` key.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    /// RFC 3339 build timestamp.
    pub created_at: String,
    /// Persisted layout version.
    pub schema_version: u32,
    /// Fingerprint of the content root this snapshot was built from.
    pub version: Fingerprint,
}

/// The fully processed site.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// All documents, in path order.
    pub docs: Vec<DocRecord>,
    /// Slugs of all documents, parallel to `docs`.
    pub slugs: Vec<Vec<String>>,
    /// Navigation tree.
    pub tree: Vec<DocTreeNode>,
    /// Search index.
    pub search_entries: Vec<DocSearchEntry>,
    /// Build provenance.
    #[serde(rename = "__meta")]
    pub meta: SnapshotMeta,
}

/// Build a [`Snapshot`] of `root` from scratch.
///
/// Unreadable documents are skipped with a warning rather than failing the
/// whole build.
pub fn build_snapshot(root: &Path, options: BuildOptions) -> Result<Snapshot, ContentError> {
    let fingerprint = compute_fingerprint(root)?;
    build_snapshot_at(root, options, fingerprint)
}

fn build_snapshot_at(
    root: &Path,
    options: BuildOptions,
    fingerprint: Fingerprint,
) -> Result<Snapshot, ContentError> {
    let paths = scan_documents(root)?;
    let doc_paths: HashSet<String> = paths.iter().cloned().collect();

    let mut docs = Vec::with_capacity(paths.len());
    for rel_path in &paths {
        let raw = match read_document(root, rel_path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %rel_path, error = %e, "Skipping unreadable document");
                continue;
            }
        };
        docs.push(build_document(
            rel_path,
            &raw,
            &doc_paths,
            Some(root),
            options,
        ));
    }

    let slugs = docs.iter().map(|d| d.slug.clone()).collect();
    let tree = build_tree(&docs);
    let search_entries = build_search_entries(&docs);

    Ok(Snapshot {
        docs,
        slugs,
        tree,
        search_entries,
        meta: SnapshotMeta {
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            schema_version: SCHEMA_VERSION,
            version: fingerprint,
        },
    })
}

/// Trait for snapshot persistence backends.
pub trait SnapshotStore: Send + Sync {
    /// Retrieve the persisted snapshot.
    ///
    /// Returns `None` on miss or unreadable data.
    fn load(&self) -> Option<Snapshot>;

    /// Persist a snapshot. Failures are non-fatal.
    fn store(&self, snapshot: &Snapshot);
}

/// No-op store used when persistence is disabled.
pub struct NullSnapshotStore;

impl SnapshotStore for NullSnapshotStore {
    fn load(&self) -> Option<Snapshot> {
        None
    }

    fn store(&self, _snapshot: &Snapshot) {}
}

/// File-backed store keeping the snapshot as `{cache_dir}/snapshot.json`.
pub struct FileSnapshotStore {
    cache_dir: PathBuf,
}

impl FileSnapshotStore {
    #[must_use]
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.cache_dir.join("snapshot.json")
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Option<Snapshot> {
        let path = self.snapshot_path();
        if !path.exists() {
            return None;
        }
        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn store(&self, snapshot: &Snapshot) {
        if let Err(e) = fs::create_dir_all(&self.cache_dir) {
            tracing::debug!(error = %e, "Failed to create cache directory");
            return;
        }

        let content = match serde_json::to_string(snapshot) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to serialize snapshot");
                return;
            }
        };

        if let Err(e) = fs::write(self.snapshot_path(), content) {
            tracing::debug!(error = %e, "Failed to write snapshot");
        }
    }
}

/// Cache freshness policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheMode {
    /// Revalidate the fingerprint on every access; rebuild on change.
    Live,
    /// Build once, serve the same snapshot until the process exits.
    Frozen,
}

struct WarmState {
    fingerprint: Fingerprint,
    snapshot: Arc<Snapshot>,
}

/// Fingerprint-keyed snapshot cache over one content root.
///
/// Access goes through [`SnapshotCache::get`]; interior mutability keeps the
/// API shareable behind an `Arc` without external locking.
pub struct SnapshotCache {
    root: PathBuf,
    options: BuildOptions,
    mode: CacheMode,
    store: Box<dyn SnapshotStore>,
    state: RwLock<Option<WarmState>>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new(
        root: PathBuf,
        options: BuildOptions,
        mode: CacheMode,
        store: Box<dyn SnapshotStore>,
    ) -> Self {
        Self {
            root,
            options,
            mode,
            store,
            state: RwLock::new(None),
        }
    }

    /// Content root this cache serves.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the current snapshot, rebuilding if needed.
    ///
    /// Cold access tries the persisted store first, accepting it only when
    /// the schema version and fingerprint both match the live content root.
    /// In [`CacheMode::Live`] every access revalidates the fingerprint; in
    /// [`CacheMode::Frozen`] the first snapshot is served unconditionally.
    pub fn get(&self) -> Result<Arc<Snapshot>, ContentError> {
        if self.mode == CacheMode::Frozen
            && let Some(warm) = self.read_state(|w| w.snapshot.clone())
        {
            return Ok(warm);
        }

        let fingerprint = compute_fingerprint(&self.root)?;
        if let Some(Some(snapshot)) =
            self.read_state(|w| (w.fingerprint == fingerprint).then(|| w.snapshot.clone()))
        {
            return Ok(snapshot);
        }

        let snapshot = match self.load_valid(fingerprint) {
            Some(snapshot) => Arc::new(snapshot),
            None => {
                let built = build_snapshot_at(&self.root, self.options, fingerprint)?;
                self.store.store(&built);
                Arc::new(built)
            }
        };

        if let Ok(mut state) = self.state.write() {
            *state = Some(WarmState {
                fingerprint,
                snapshot: snapshot.clone(),
            });
        }
        Ok(snapshot)
    }

    /// Load the persisted snapshot if it matches the live fingerprint.
    fn load_valid(&self, fingerprint: Fingerprint) -> Option<Snapshot> {
        let snapshot = self.store.load()?;
        if snapshot.meta.schema_version != SCHEMA_VERSION {
            tracing::debug!(
                found = snapshot.meta.schema_version,
                expected = SCHEMA_VERSION,
                "Persisted snapshot schema mismatch"
            );
            return None;
        }
        if snapshot.meta.version != fingerprint {
            tracing::debug!("Persisted snapshot fingerprint stale");
            return None;
        }
        Some(snapshot)
    }

    fn read_state<T>(&self, f: impl FnOnce(&WarmState) -> T) -> Option<T> {
        self.state.read().ok()?.as_ref().map(f)
    }
}
