//! Link and asset target resolution.
//!
//! Given a raw href/src from a markdown document and the referencing
//! document's path relative to the content root, computes a safe normalized
//! target. Relative paths are resolved against the document's directory,
//! root-relative paths (leading `/`) against the content root. A `..` walk
//! that would escape the content root fails resolution and the original
//! string is kept — no resolved path may reference a location outside the
//! content root.

use std::collections::HashSet;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Route prefix for document pages.
const DOC_ROUTE_PREFIX: &str = "/docs";
/// Route prefix for the asset-serving endpoint.
const ASSET_ROUTE_PREFIX: &str = "/api/assets";

/// Characters percent-encoded within a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%')
    .add(b'{')
    .add(b'}')
    .add(b'[')
    .add(b']')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// Outcome of resolving a raw URL-like string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedTarget {
    /// External URL: left unchanged, rendered with `target="_blank"`.
    External,
    /// Left unchanged (fragment-only, `data:`, or failed resolution).
    PassThrough,
    /// Another document: route under `/docs`.
    Doc {
        /// Full route including any `?query#fragment` suffix.
        route: String,
    },
    /// An opaque asset: route under `/api/assets`.
    Asset {
        /// Full route including any `?query#fragment` suffix.
        route: String,
        /// Normalized path relative to the content root.
        rel_path: String,
    },
}

/// Resolve a raw href/src against the referencing document's path.
///
/// `rel_path` is the referencing document's POSIX path relative to the
/// content root (e.g., "guides/setup.md"). `doc_paths` is the set of all
/// known document paths, used to map extensionless sibling references to
/// document routes.
#[must_use]
pub fn resolve_target(url: &str, rel_path: &str, doc_paths: &HashSet<String>) -> ResolvedTarget {
    if is_external(url) {
        return ResolvedTarget::External;
    }
    if url.starts_with('#') || url.starts_with("data:") {
        return ResolvedTarget::PassThrough;
    }

    let (path_part, suffix) = split_url_suffix(url);
    if path_part.is_empty() {
        return ResolvedTarget::PassThrough;
    }

    // Root-relative targets resolve against the content root; everything
    // else against the referencing document's directory.
    let base: Vec<&str> = if path_part.starts_with('/') {
        Vec::new()
    } else {
        parent_segments(rel_path)
    };

    let Some(segments) = normalize_segments(path_part, &base) else {
        return ResolvedTarget::PassThrough;
    };
    if segments.is_empty() {
        return ResolvedTarget::PassThrough;
    }

    let resolved = segments.join("/");

    if has_markdown_extension(&resolved) {
        let route = format!("{}/{}{suffix}", DOC_ROUTE_PREFIX, encode_slug(&segments));
        return ResolvedTarget::Doc { route };
    }

    // Extensionless reference to a sibling document.
    if doc_paths.contains(&format!("{resolved}.md")) || doc_paths.contains(&format!("{resolved}.mdx"))
    {
        let encoded: Vec<String> = segments.iter().map(|s| encode_segment(s)).collect();
        let route = format!("{}/{}{suffix}", DOC_ROUTE_PREFIX, encoded.join("/"));
        return ResolvedTarget::Doc { route };
    }

    let encoded: Vec<String> = segments.iter().map(|s| encode_segment(s)).collect();
    let route = format!("{}/{}{suffix}", ASSET_ROUTE_PREFIX, encoded.join("/"));
    ResolvedTarget::Asset {
        route,
        rel_path: resolved,
    }
}

/// Check whether a URL matches the external scheme allow-list.
#[must_use]
pub fn is_external(url: &str) -> bool {
    url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
}

/// Split a URL into its path and `?query#fragment` suffix.
///
/// The suffix starts at whichever of `?` or `#` appears first and is kept
/// verbatim.
#[must_use]
pub fn split_url_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(pos) => (&url[..pos], &url[pos..]),
        None => (url, ""),
    }
}

/// Percent-encode one path segment.
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Directory segments of a document path (everything before the file name).
fn parent_segments(rel_path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = rel_path.split('/').filter(|s| !s.is_empty()).collect();
    segments.pop();
    segments
}

/// Walk path segments starting from `base`, returning the normalized stack.
///
/// Empty and `.` segments are dropped; `..` pops the stack. Popping an empty
/// stack means the path escapes the content root and resolution fails.
fn normalize_segments(path: &str, base: &[&str]) -> Option<Vec<String>> {
    let mut stack: Vec<String> = base.iter().map(|s| (*s).to_owned()).collect();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                stack.pop()?;
            }
            seg => stack.push(seg.to_owned()),
        }
    }

    Some(stack)
}

/// Check for a markdown file extension (`.md` or `.mdx`).
fn has_markdown_extension(path: &str) -> bool {
    let lower = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".mdx")
}

/// Encode a document path as a slug route: extension stripped from the last
/// segment, each segment percent-encoded.
fn encode_slug(segments: &[String]) -> String {
    let mut encoded: Vec<String> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let part = if i == segments.len() - 1 {
            strip_markdown_extension(segment)
        } else {
            segment
        };
        encoded.push(encode_segment(part));
    }
    encoded.join("/")
}

/// Strip a `.md`/`.mdx` extension from a file name.
fn strip_markdown_extension(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".mdx") {
        &name[..name.len() - 4]
    } else if lower.ends_with(".md") {
        &name[..name.len() - 3]
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn test_external_urls() {
        let set = docs(&[]);
        for url in [
            "https://example.com",
            "http://example.com/a.md",
            "mailto:a@b.c",
            "tel:+123",
            "//cdn.example.com/x.png",
        ] {
            assert_eq!(resolve_target(url, "guide.md", &set), ResolvedTarget::External);
        }
    }

    #[test]
    fn test_fragment_and_data_pass_through() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("#section", "guide.md", &set),
            ResolvedTarget::PassThrough
        );
        assert_eq!(
            resolve_target("data:image/png;base64,AAAA", "guide.md", &set),
            ResolvedTarget::PassThrough
        );
    }

    #[test]
    fn test_sibling_doc_link() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("./other.md", "guides/setup.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/guides/other".to_owned()
            }
        );
    }

    #[test]
    fn test_parent_doc_link() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("../intro.md", "guides/setup.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/intro".to_owned()
            }
        );
    }

    #[test]
    fn test_root_relative_doc_link() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("/api/reference.md", "guides/deep/setup.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/api/reference".to_owned()
            }
        );
    }

    #[test]
    fn test_traversal_escape_fails() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("../../../etc/passwd", "guides/setup.md", &set),
            ResolvedTarget::PassThrough
        );
        assert_eq!(
            resolve_target("../../a.md", "top.md", &set),
            ResolvedTarget::PassThrough
        );
    }

    #[test]
    fn test_traversal_to_root_boundary_ok() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("../top.md", "guides/setup.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/top".to_owned()
            }
        );
    }

    #[test]
    fn test_fragment_suffix_preserved() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("./other.md#install", "guides/setup.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/guides/other#install".to_owned()
            }
        );
    }

    #[test]
    fn test_query_suffix_preserved_on_asset() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("images/a.png?v=2", "guides/setup.md", &set),
            ResolvedTarget::Asset {
                route: "/api/assets/guides/images/a.png?v=2".to_owned(),
                rel_path: "guides/images/a.png".to_owned(),
            }
        );
    }

    #[test]
    fn test_known_extensionless_doc() {
        let set = docs(&["guides/other.md"]);
        assert_eq!(
            resolve_target("./other", "guides/setup.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/guides/other".to_owned()
            }
        );
    }

    #[test]
    fn test_unknown_extensionless_is_asset() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("./other", "guides/setup.md", &set),
            ResolvedTarget::Asset {
                route: "/api/assets/guides/other".to_owned(),
                rel_path: "guides/other".to_owned(),
            }
        );
    }

    #[test]
    fn test_segments_percent_encoded() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("my file.png", "guide.md", &set),
            ResolvedTarget::Asset {
                route: "/api/assets/my%20file.png".to_owned(),
                rel_path: "my file.png".to_owned(),
            }
        );
    }

    #[test]
    fn test_mdx_extension() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("./page.mdx", "guide.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/page".to_owned()
            }
        );
    }

    #[test]
    fn test_dot_segments_dropped() {
        let set = docs(&[]);
        assert_eq!(
            resolve_target("././a//b.md", "guide.md", &set),
            ResolvedTarget::Doc {
                route: "/docs/a/b".to_owned()
            }
        );
    }

    #[test]
    fn test_split_url_suffix() {
        assert_eq!(split_url_suffix("a.png?v=1#x"), ("a.png", "?v=1#x"));
        assert_eq!(split_url_suffix("a.png#x?v=1"), ("a.png", "#x?v=1"));
        assert_eq!(split_url_suffix("a.png"), ("a.png", ""));
    }
}
