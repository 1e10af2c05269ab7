//! Document records and metadata derivation.
//!
//! A [`DocRecord`] is the fully processed form of one markdown file: rendered
//! HTML plus the metadata the navigation tree and search index are built
//! from. Metadata falls back through a precedence chain so documents without
//! front-matter still get sensible titles and descriptions.

use std::collections::HashSet;
use std::path::Path;

use mdsite_renderer::{HeadingEntry, MarkdownRenderer, rewrite_embeds, sanitize_html};
use serde::{Deserialize, Serialize};

use crate::frontmatter::{normalize_date, split_front_matter};

/// A fully processed document.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRecord {
    /// Path relative to the content root, forward slashes.
    pub rel_path: String,

    /// Path segments with the markdown extension stripped from the last.
    pub slug: Vec<String>,

    /// Display title: front-matter, first `#` heading, or file stem.
    pub title: String,

    /// Short description: front-matter or first body text line.
    pub description: String,

    /// ISO `YYYY-MM-DD` authoring date, empty when absent.
    pub date: String,

    /// Sanitized rendered HTML.
    pub content_html: String,

    /// Level-2/3 heading outline for the table of contents.
    pub headings: Vec<HeadingEntry>,
}

/// Options controlling document processing.
#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Rewrite Obsidian embeds to root-relative targets.
    pub embed_root_relative: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            embed_root_relative: true,
        }
    }
}

/// Process one markdown source into a [`DocRecord`].
///
/// `doc_paths` is the set of all known document paths, used for cross-link
/// resolution. `content_root` enables image dimension probing when the
/// referenced files exist on disk.
#[must_use]
pub fn build_document(
    rel_path: &str,
    raw: &str,
    doc_paths: &HashSet<String>,
    content_root: Option<&Path>,
    options: BuildOptions,
) -> DocRecord {
    let (matter, body) = split_front_matter(raw);
    let markdown = rewrite_embeds(body, options.embed_root_relative);

    let mut renderer = MarkdownRenderer::new(rel_path, doc_paths);
    if let Some(root) = content_root {
        renderer = renderer.with_content_root(root);
    }
    let output = renderer.render_markdown(&markdown);

    let title = matter
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| file_stem(rel_path));
    let description = matter
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .or_else(|| first_body_line(body))
        .unwrap_or_default();

    DocRecord {
        rel_path: rel_path.to_owned(),
        slug: path_to_slug(rel_path),
        title,
        description,
        date: normalize_date(matter.date.as_ref()),
        content_html: sanitize_html(&output.html),
        headings: output.headings,
    }
}

/// Split a relative path into slug segments, stripping the extension from
/// the last segment.
#[must_use]
pub fn path_to_slug(rel_path: &str) -> Vec<String> {
    let mut segments: Vec<String> = rel_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect();
    if let Some(last) = segments.last_mut() {
        *last = strip_markdown_extension(last).to_owned();
    }
    segments
}

/// Strip a `.md`/`.mdx` extension, case-insensitively.
fn strip_markdown_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    for ext in [".md", ".mdx"] {
        if lower.ends_with(ext) {
            return &name[..name.len() - ext.len()];
        }
    }
    name
}

/// Extract the first `# ` heading line, if any.
fn first_heading(body: &str) -> Option<String> {
    body.lines().find_map(|line| {
        line.trim_start()
            .strip_prefix("# ")
            .map(|rest| rest.trim().to_owned())
            .filter(|t| !t.is_empty())
    })
}

/// Extract the first prose line of the body, skipping headings, images,
/// horizontal rules and fenced code.
fn first_body_line(body: &str) -> Option<String> {
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence
            || trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("![")
            || is_horizontal_rule(trimmed)
        {
            continue;
        }
        let cleaned: String = trimmed
            .chars()
            .filter(|c| !matches!(c, '*' | '_' | '`'))
            .collect();
        let cleaned = cleaned.trim().to_owned();
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }
    None
}

/// Match `---`, `***` and `___` rules of any length.
fn is_horizontal_rule(line: &str) -> bool {
    line.len() >= 3
        && (line.chars().all(|c| c == '-')
            || line.chars().all(|c| c == '*')
            || line.chars().all(|c| c == '_'))
}

/// Derive a title from the file name when nothing better exists.
fn file_stem(rel_path: &str) -> String {
    let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    strip_markdown_extension(name).to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(rel_path: &str, raw: &str) -> DocRecord {
        build_document(
            rel_path,
            raw,
            &HashSet::new(),
            None,
            BuildOptions::default(),
        )
    }

    #[test]
    fn test_title_prefers_front_matter() {
        let doc = build("a/b.md", "---\ntitle: From Matter\n---\n# From Heading\n");
        assert_eq!(doc.title, "From Matter");
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let doc = build("a/b.md", "# From Heading\n\ntext\n");
        assert_eq!(doc.title, "From Heading");
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let doc = build("guides/setup-notes.md", "just text\n");
        assert_eq!(doc.title, "setup-notes");
    }

    #[test]
    fn test_description_skips_non_prose() {
        let raw = "# Title\n\n![diagram](d.png)\n\n---\n\n```\ncode\n```\n\n*Actual* `intro` text.\n";
        let doc = build("x.md", raw);
        assert_eq!(doc.description, "Actual intro text.");
    }

    #[test]
    fn test_description_prefers_front_matter() {
        let doc = build("x.md", "---\ndescription: Given\n---\nBody line\n");
        assert_eq!(doc.description, "Given");
    }

    #[test]
    fn test_description_empty_without_prose() {
        let doc = build("x.md", "# Only a heading\n");
        assert_eq!(doc.description, "");
    }

    #[test]
    fn test_slug_strips_extension() {
        assert_eq!(path_to_slug("guides/intro.md"), vec!["guides", "intro"]);
        assert_eq!(path_to_slug("api/Page.MDX"), vec!["api", "Page"]);
        assert_eq!(path_to_slug("README.md"), vec!["README"]);
    }

    #[test]
    fn test_content_is_sanitized() {
        let doc = build("x.md", "hello\n\n<script>alert(1)</script>\n");
        assert!(!doc.content_html.contains("script"));
        assert!(doc.content_html.contains("<p>hello</p>"));
    }

    #[test]
    fn test_headings_collected() {
        let doc = build("x.md", "# Top\n\n## First\n\n### Nested\n\n#### Deep\n");
        let texts: Vec<&str> = doc.headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["First", "Nested"]);
    }

    #[test]
    fn test_embeds_rewritten_before_render() {
        let doc = build("x.md", "![[assets/pic.png|A pic]]\n");
        assert!(doc.content_html.contains("alt=\"A pic\""), "{}", doc.content_html);
    }

    #[test]
    fn test_date_normalized() {
        let doc = build("x.md", "---\ndate: 2024-06-02T08:00:00Z\n---\ntext\n");
        assert_eq!(doc.date, "2024-06-02");
    }
}
