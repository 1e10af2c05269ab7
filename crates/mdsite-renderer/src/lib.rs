//! Markdown-to-HTML rendering pipeline for mdsite.
//!
//! Converts Obsidian-flavored markdown into sanitized HTML:
//!
//! 1. [`rewrite_embeds`] rewrites `![[target|alt]]` embeds to standard image
//!    syntax before parsing.
//! 2. [`MarkdownRenderer`] converts markdown to HTML with custom heading,
//!    code-block, inline-code, link and image handling; cross-links and
//!    image sources are resolved through [`resolve`] with traversal safety.
//! 3. [`sanitize_html`] restricts the result to a fixed tag/attribute
//!    allow-list.
//!
//! All steps are pure functions of their inputs; per-node resolution
//! failures degrade to passing the original text through.

mod embed;
mod renderer;
pub mod resolve;
mod sanitize;
mod state;

pub use embed::rewrite_embeds;
pub use renderer::{MarkdownRenderer, RenderOutput};
pub use sanitize::sanitize_html;
pub use state::{HeadingEntry, escape_html, slugify};
