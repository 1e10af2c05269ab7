//! Search index and scoring.
//!
//! The index is a flat list of per-document entries; queries score each
//! entry additively and return matches ordered by score. Scoring favors
//! exact title matches over exact path matches over substring hits.

use serde::{Deserialize, Serialize};

use crate::document::DocRecord;

/// One searchable entry, a projection of [`DocRecord`] metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocSearchEntry {
    /// Content-relative document path.
    pub rel_path: String,
    /// Slug segments for routing.
    pub slug: Vec<String>,
    /// Display title.
    pub title: String,
    /// Short description.
    pub description: String,
}

/// A scored search hit.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit<'a> {
    /// Matched entry.
    #[serde(flatten)]
    pub entry: &'a DocSearchEntry,
    /// Additive relevance score.
    pub score: u32,
}

/// Build the search index from processed documents.
#[must_use]
pub fn build_search_entries(docs: &[DocRecord]) -> Vec<DocSearchEntry> {
    docs.iter()
        .map(|doc| DocSearchEntry {
            rel_path: doc.rel_path.clone(),
            slug: doc.slug.clone(),
            title: doc.title.clone(),
            description: doc.description.clone(),
        })
        .collect()
}

/// Run a case-insensitive query over the index.
///
/// Blank queries return no hits. Results are sorted by descending score;
/// ties keep index order, which is path order.
#[must_use]
pub fn search<'a>(entries: &'a [DocSearchEntry], query: &str) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = entries
        .iter()
        .filter_map(|entry| {
            let score = score_entry(entry, &query);
            (score > 0).then(|| SearchHit { entry, score })
        })
        .collect();
    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits
}

/// Score one entry against a lowercased query.
fn score_entry(entry: &DocSearchEntry, query: &str) -> u32 {
    let title = entry.title.to_lowercase();
    let slug = entry.slug.join("/").to_lowercase();
    let rel_path = entry.rel_path.to_lowercase();
    let description = entry.description.to_lowercase();

    let mut score = 0;
    if title == query {
        score += 3;
    }
    if slug == query || rel_path == query {
        score += 2;
    }
    if title.contains(query) {
        score += 1;
    }
    if slug.contains(query) {
        score += 1;
    }
    if description.contains(query) {
        score += 1;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(rel_path: &str, title: &str, description: &str) -> DocSearchEntry {
        DocSearchEntry {
            rel_path: rel_path.to_owned(),
            slug: crate::document::path_to_slug(rel_path),
            title: title.to_owned(),
            description: description.to_owned(),
        }
    }

    fn index() -> Vec<DocSearchEntry> {
        vec![
            entry("guides/setup.md", "Setup", "How to install and run"),
            entry("api/setup.md", "API Setup Reference", "Endpoints for setup"),
            entry("faq.md", "FAQ", "Common questions"),
        ]
    }

    #[test]
    fn test_exact_title_outranks_substring() {
        let entries = index();
        let hits = search(&entries, "setup");
        assert_eq!(hits[0].entry.rel_path, "guides/setup.md");
        // exact title 3 + exact slug? no + title substring 1 + slug substring 1 + desc? no
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_exact_slug_scores() {
        let entries = index();
        let hits = search(&entries, "guides/setup");
        assert_eq!(hits[0].entry.rel_path, "guides/setup.md");
        // exact slug 2 + slug substring 1
        assert_eq!(hits[0].score, 3);
    }

    #[test]
    fn test_case_insensitive() {
        let entries = index();
        let hits = search(&entries, "FAQ");
        assert_eq!(hits[0].entry.title, "FAQ");
        // exact title 3 + exact slug 2 + title substring 1 + slug substring 1
        assert_eq!(hits[0].score, 7);
    }

    #[test]
    fn test_description_substring() {
        let entries = index();
        let hits = search(&entries, "questions");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.rel_path, "faq.md");
        assert_eq!(hits[0].score, 1);
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let entries = index();
        assert!(search(&entries, "").is_empty());
        assert!(search(&entries, "   ").is_empty());
    }

    #[test]
    fn test_no_match_returns_nothing() {
        let entries = index();
        assert!(search(&entries, "zzzzz").is_empty());
    }

    #[test]
    fn test_tie_keeps_path_order() {
        let entries = vec![
            entry("a/page.md", "Alpha Page", ""),
            entry("b/page.md", "Beta Page", ""),
        ];
        let hits = search(&entries, "page");
        assert_eq!(hits[0].entry.rel_path, "a/page.md");
        assert_eq!(hits[1].entry.rel_path, "b/page.md");
    }
}
