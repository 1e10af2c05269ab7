//! Obsidian-embed preprocessing.
//!
//! Rewrites the `![[target]]` / `![[target|alt]]` embed shorthand into
//! standard markdown image syntax before parsing, since the embed syntax is
//! not part of the markdown grammar.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Matches `![[...]]` embeds, with an optional `|alt` part.
static EMBED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]|]+)(?:\|([^\]]*))?\]\]").unwrap());

/// Rewrite Obsidian embeds to standard markdown image syntax.
///
/// For each `![[target|alt]]` match the target is trimmed, backslashes are
/// converted to forward slashes, and a single leading `/` or `./` is
/// stripped. When `root_relative` is set the target is prefixed with `/` so
/// later resolution treats it as content-root-relative instead of
/// document-relative.
///
/// Text without embeds passes through unchanged (borrowed).
#[must_use]
pub fn rewrite_embeds(text: &str, root_relative: bool) -> Cow<'_, str> {
    EMBED_PATTERN.replace_all(text, |caps: &Captures<'_>| {
        let target = caps[1].trim().replace('\\', "/");
        let target = target
            .strip_prefix("./")
            .or_else(|| target.strip_prefix('/'))
            .unwrap_or(&target);
        let alt = caps.get(2).map_or("", |m| m.as_str());

        if root_relative {
            format!("![{alt}](/{target})")
        } else {
            format!("![{alt}]({target})")
        }
    })
}
