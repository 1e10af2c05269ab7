//! Content pipeline for mdsite.
//!
//! Turns a directory of markdown files into a servable site:
//!
//! - [`scanner`] walks the content root and fingerprints it for change
//!   detection.
//! - [`document`] renders each file into a [`DocRecord`] with derived
//!   metadata.
//! - [`tree`] and [`search`] build the navigation tree and search index.
//! - [`snapshot`] assembles everything into a [`Snapshot`] and caches it,
//!   keyed by the fingerprint and optionally persisted to disk.

mod document;
mod frontmatter;
pub mod scanner;
pub mod search;
mod snapshot;
mod tree;

use std::path::PathBuf;

pub use document::{BuildOptions, DocRecord, build_document, path_to_slug};
pub use frontmatter::{FrontMatter, normalize_date, split_front_matter};
pub use scanner::{Fingerprint, compute_fingerprint, scan_documents};
pub use search::{DocSearchEntry, SearchHit, build_search_entries, search};
pub use snapshot::{
    CacheMode, FileSnapshotStore, NullSnapshotStore, SCHEMA_VERSION, Snapshot, SnapshotCache,
    SnapshotMeta, SnapshotStore, build_snapshot,
};
pub use tree::{DocTreeNode, build_tree};

/// Errors from scanning and building content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Filesystem access failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Find a document by slug segments.
///
/// An empty slug selects the landing document: `getting-started/welcome.md`
/// when present, else the first `README.md`, else the first document. A
/// non-empty slug must match a document's slug exactly.
#[must_use]
pub fn find_doc_by_slug<'a>(docs: &'a [DocRecord], slug: &[String]) -> Option<&'a DocRecord> {
    if slug.is_empty() {
        return docs
            .iter()
            .find(|d| d.rel_path == "getting-started/welcome.md")
            .or_else(|| {
                docs.iter()
                    .find(|d| d.rel_path.rsplit('/').next() == Some("README.md"))
            })
            .or_else(|| docs.first());
    }
    docs.iter().find(|d| d.slug == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(rel_path: &str) -> DocRecord {
        DocRecord {
            rel_path: rel_path.to_owned(),
            slug: path_to_slug(rel_path),
            title: String::new(),
            description: String::new(),
            date: String::new(),
            content_html: String::new(),
            headings: Vec::new(),
        }
    }

    fn slug(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_empty_slug_prefers_welcome() {
        let docs = vec![
            doc("README.md"),
            doc("getting-started/welcome.md"),
            doc("other.md"),
        ];
        let found = find_doc_by_slug(&docs, &[]).unwrap();
        assert_eq!(found.rel_path, "getting-started/welcome.md");
    }

    #[test]
    fn test_empty_slug_falls_back_to_readme() {
        let docs = vec![doc("zzz.md"), doc("guides/README.md")];
        let found = find_doc_by_slug(&docs, &[]).unwrap();
        assert_eq!(found.rel_path, "guides/README.md");
    }

    #[test]
    fn test_empty_slug_falls_back_to_first() {
        let docs = vec![doc("alpha.md"), doc("beta.md")];
        let found = find_doc_by_slug(&docs, &[]).unwrap();
        assert_eq!(found.rel_path, "alpha.md");
    }

    #[test]
    fn test_empty_slug_empty_docs() {
        assert!(find_doc_by_slug(&[], &[]).is_none());
    }

    #[test]
    fn test_exact_slug_match() {
        let docs = vec![doc("guides/intro.md"), doc("guides/advanced.md")];
        let found = find_doc_by_slug(&docs, &slug(&["guides", "advanced"])).unwrap();
        assert_eq!(found.rel_path, "guides/advanced.md");
    }

    #[test]
    fn test_unknown_slug_is_none() {
        let docs = vec![doc("guides/intro.md")];
        assert!(find_doc_by_slug(&docs, &slug(&["missing"])).is_none());
        // Prefix of a real slug does not match
        assert!(find_doc_by_slug(&docs, &slug(&["guides"])).is_none());
    }
}
