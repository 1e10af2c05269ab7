//! Navigation tree construction.
//!
//! Builds a folder/file tree from the flat document list. Siblings sort
//! folders before files, then case-insensitively by name, so the sidebar
//! order is stable across platforms and rescans.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::document::DocRecord;

/// One node of the navigation tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DocTreeNode {
    /// An intermediate directory.
    #[serde(rename = "folder", rename_all = "camelCase")]
    Folder {
        /// Directory name.
        name: String,
        /// Content-relative directory path.
        key: String,
        /// Sorted child nodes.
        children: Vec<DocTreeNode>,
    },

    /// A document leaf.
    #[serde(rename = "file", rename_all = "camelCase")]
    File {
        /// File name with the markdown extension stripped.
        name: String,
        /// Content-relative file path.
        key: String,
        /// Full document path (same as `key`).
        rel_path: String,
        /// Slug segments for routing.
        slug: Vec<String>,
        /// Display title.
        title: String,
    },
}

impl DocTreeNode {
    fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::File { name, .. } => name,
        }
    }

    fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }
}

/// Build the navigation tree from processed documents.
///
/// Documents are inserted in order; sibling ordering comes from the final
/// sort pass, not insertion order.
#[must_use]
pub fn build_tree(docs: &[DocRecord]) -> Vec<DocTreeNode> {
    let mut roots: Vec<DocTreeNode> = Vec::new();
    for doc in docs {
        insert_doc(&mut roots, doc);
    }
    sort_siblings(&mut roots);
    roots
}

fn insert_doc(roots: &mut Vec<DocTreeNode>, doc: &DocRecord) {
    let segments: Vec<&str> = doc.rel_path.split('/').filter(|s| !s.is_empty()).collect();
    let Some((file_name, dirs)) = segments.split_last() else {
        return;
    };

    let mut current = roots;
    let mut key_prefix = String::new();
    for dir in dirs {
        if !key_prefix.is_empty() {
            key_prefix.push('/');
        }
        key_prefix.push_str(dir);

        let position = current.iter().position(
            |node| matches!(node, DocTreeNode::Folder { key, .. } if key == &key_prefix),
        );
        let index = match position {
            Some(i) => i,
            None => {
                current.push(DocTreeNode::Folder {
                    name: (*dir).to_owned(),
                    key: key_prefix.clone(),
                    children: Vec::new(),
                });
                current.len() - 1
            }
        };
        let DocTreeNode::Folder { children, .. } = &mut current[index] else {
            unreachable!("position matched a folder");
        };
        current = children;
    }

    current.push(DocTreeNode::File {
        name: doc
            .slug
            .last()
            .cloned()
            .unwrap_or_else(|| (*file_name).to_owned()),
        key: doc.rel_path.clone(),
        rel_path: doc.rel_path.clone(),
        slug: doc.slug.clone(),
        title: doc.title.clone(),
    });
}

/// Sort siblings recursively: folders first, then case-insensitive by name.
fn sort_siblings(nodes: &mut [DocTreeNode]) {
    nodes.sort_by(|a, b| match (a.is_folder(), b.is_folder()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name())),
    });
    for node in nodes {
        if let DocTreeNode::Folder { children, .. } = node {
            sort_siblings(children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::path_to_slug;
    use pretty_assertions::assert_eq;

    fn doc(rel_path: &str, title: &str) -> DocRecord {
        DocRecord {
            rel_path: rel_path.to_owned(),
            slug: path_to_slug(rel_path),
            title: title.to_owned(),
            description: String::new(),
            date: String::new(),
            content_html: String::new(),
            headings: Vec::new(),
        }
    }

    fn names(nodes: &[DocTreeNode]) -> Vec<&str> {
        nodes.iter().map(DocTreeNode::name).collect()
    }

    #[test]
    fn test_folders_sort_before_files() {
        let docs = vec![
            doc("zebra.md", "Zebra"),
            doc("guides/intro.md", "Intro"),
            doc("alpha.md", "Alpha"),
        ];
        let tree = build_tree(&docs);
        assert_eq!(names(&tree), vec!["guides", "alpha", "zebra"]);
    }

    #[test]
    fn test_case_insensitive_sibling_order() {
        let docs = vec![
            doc("Beta.md", "B"),
            doc("alpha.md", "A"),
            doc("Gamma.md", "G"),
        ];
        let tree = build_tree(&docs);
        assert_eq!(names(&tree), vec!["alpha", "Beta", "Gamma"]);
    }

    #[test]
    fn test_nested_folders_share_parent() {
        let docs = vec![
            doc("api/v1/users.md", "Users"),
            doc("api/v1/teams.md", "Teams"),
            doc("api/overview.md", "Overview"),
        ];
        let tree = build_tree(&docs);
        assert_eq!(tree.len(), 1);
        let DocTreeNode::Folder { key, children, .. } = &tree[0] else {
            panic!("expected folder");
        };
        assert_eq!(key, "api");
        assert_eq!(names(children), vec!["v1", "overview"]);
        let DocTreeNode::Folder { children: v1, .. } = &children[0] else {
            panic!("expected folder");
        };
        assert_eq!(names(v1), vec!["teams", "users"]);
    }

    #[test]
    fn test_file_node_fields() {
        let tree = build_tree(&[doc("guides/setup.md", "Setup Guide")]);
        let DocTreeNode::Folder { children, .. } = &tree[0] else {
            panic!("expected folder");
        };
        let DocTreeNode::File {
            name,
            key,
            rel_path,
            slug,
            title,
        } = &children[0]
        else {
            panic!("expected file");
        };
        assert_eq!(name, "setup");
        assert_eq!(key, "guides/setup.md");
        assert_eq!(rel_path, "guides/setup.md");
        assert_eq!(slug, &vec!["guides".to_owned(), "setup".to_owned()]);
        assert_eq!(title, "Setup Guide");
    }

    #[test]
    fn test_empty_input_yields_empty_tree() {
        assert!(build_tree(&[]).is_empty());
    }

    #[test]
    fn test_serialization_shape() {
        let tree = build_tree(&[doc("a/b.md", "B")]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["type"], "folder");
        assert_eq!(json[0]["children"][0]["type"], "file");
        assert_eq!(json[0]["children"][0]["relPath"], "a/b.md");
    }
}
