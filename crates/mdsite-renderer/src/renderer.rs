//! Markdown renderer with custom link, image, heading and code handling.

use std::collections::HashSet;
use std::fmt::Write;
use std::path::Path;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::resolve::{ResolvedTarget, resolve_target};
use crate::state::{CodeBlockState, HeadingEntry, HeadingState, ImageState, escape_html};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Rendered HTML content (unsanitized).
    pub html: String,
    /// Level-2/3 heading outline, in document order.
    pub headings: Vec<HeadingEntry>,
}

/// Markdown renderer.
///
/// Wraps a `pulldown-cmark` event stream with five custom hooks: headings
/// get slugified unique ids, fenced code gets a copy-button wrapper, inline
/// code gets a styled element, links and images get their targets resolved
/// relative to the referencing document. Per-node resolution failures
/// degrade to passing the original string through; rendering never fails.
pub struct MarkdownRenderer<'a> {
    output: String,
    list_stack: Vec<bool>,
    code: CodeBlockState,
    image: ImageState,
    heading: HeadingState,
    in_table_head: bool,
    pending_image: Option<(String, String)>,
    rel_path: &'a str,
    doc_paths: &'a HashSet<String>,
    content_root: Option<&'a Path>,
}

impl<'a> MarkdownRenderer<'a> {
    /// Create a renderer for a document at `rel_path`.
    ///
    /// `doc_paths` is the full set of known document paths, used to resolve
    /// extensionless cross-links to document routes.
    #[must_use]
    pub fn new(rel_path: &'a str, doc_paths: &'a HashSet<String>) -> Self {
        Self {
            output: String::with_capacity(4096),
            list_stack: Vec::new(),
            code: CodeBlockState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            in_table_head: false,
            pending_image: None,
            rel_path,
            doc_paths,
            content_root: None,
        }
    }

    /// Set the content root for image pixel-dimension probing.
    #[must_use]
    pub fn with_content_root(mut self, root: &'a Path) -> Self {
        self.content_root = Some(root);
        self
    }

    /// Render markdown text and return the HTML plus heading outline.
    pub fn render_markdown(mut self, markdown: &str) -> RenderOutput {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;

        for event in Parser::new_ext(markdown, options) {
            self.process_event(event);
        }

        RenderOutput {
            html: self.output,
            headings: self.heading.take_entries(),
        }
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the id is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) if !info.is_empty() => {
                        let lang = info.split_whitespace().next().unwrap_or("");
                        (!lang.is_empty()).then(|| lang.to_owned())
                    }
                    _ => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => {
                self.list_stack.push(start.is_some());
                match start {
                    Some(1) => self.output.push_str("<ol>"),
                    Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                    None => self.output.push_str("<ul>"),
                }
            }
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(_) => self.output.push_str("<table>"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => self.output.push_str("<tr>"),
            Tag::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "<th>" } else { "<td>" });
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link {
                dest_url, title, ..
            } => self.start_link(&dest_url, &title),
            Tag::Image {
                dest_url, title, ..
            } => {
                // Collect alt text; the element is written in end_tag.
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    )
                    .unwrap();
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                self.code_block(lang.as_deref(), &content);
            }
            TagEnd::List(ordered) => {
                self.list_stack.pop();
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    self.write_image(&src, &alt, &title);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.in_table_head = false;
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output
                    .push_str(if self.in_table_head { "</th>" } else { "</td>" });
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
        }
    }

    /// Open an anchor with a resolved href.
    ///
    /// External targets additionally get `target="_blank"` and a
    /// `noreferrer noopener` relation. Unresolvable targets keep the
    /// original href untouched.
    fn start_link(&mut self, dest_url: &str, title: &str) {
        let resolved = resolve_target(dest_url, self.rel_path, self.doc_paths);
        let (href, external) = match &resolved {
            ResolvedTarget::External => (dest_url, true),
            ResolvedTarget::PassThrough => (dest_url, false),
            ResolvedTarget::Doc { route } | ResolvedTarget::Asset { route, .. } => {
                (route.as_str(), false)
            }
        };

        let mut tag = format!(r#"<a href="{}""#, escape_html(href));
        if !title.is_empty() {
            write!(tag, r#" title="{}""#, escape_html(title)).unwrap();
        }
        if external {
            tag.push_str(r#" target="_blank" rel="noreferrer noopener""#);
        }
        tag.push('>');
        self.push_inline(&tag);
    }

    /// Write an image element with a resolved src and probed dimensions.
    fn write_image(&mut self, src: &str, alt: &str, title: &str) {
        let resolved = resolve_target(src, self.rel_path, self.doc_paths);
        let (src, dims) = match &resolved {
            ResolvedTarget::Asset { route, rel_path } => {
                (route.as_str(), self.probe_dimensions(rel_path))
            }
            ResolvedTarget::Doc { route } => (route.as_str(), None),
            ResolvedTarget::External | ResolvedTarget::PassThrough => (src, None),
        };

        write!(
            self.output,
            r#"<img src="{}" alt="{}""#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
        if !title.is_empty() {
            write!(self.output, r#" title="{}""#, escape_html(title)).unwrap();
        }
        if let Some((width, height)) = dims {
            write!(self.output, r#" width="{width}" height="{height}""#).unwrap();
        }
        self.output.push_str(r#" loading="lazy">"#);
    }

    /// Read pixel dimensions from the referenced file under the content
    /// root. Missing or unreadable files are skipped silently.
    fn probe_dimensions(&self, rel_path: &str) -> Option<(u32, u32)> {
        let root = self.content_root?;
        match image::image_dimensions(root.join(rel_path)) {
            Ok(dims) => Some(dims),
            Err(e) => {
                tracing::debug!(path = %rel_path, error = %e, "Image dimension probe failed");
                None
            }
        }
    }

    /// Write a fenced code block wrapped in a container with a header
    /// showing the language tag and a copy button. The body is escaped but
    /// not highlighted.
    fn code_block(&mut self, lang: Option<&str>, content: &str) {
        self.output.push_str(r#"<div class="code-block">"#);
        self.output
            .push_str(r#"<div class="code-block-header"><span class="code-block-lang">"#);
        if let Some(lang) = lang {
            self.output
                .push_str(&escape_html(&lang.to_uppercase()));
        }
        self.output.push_str(
            r#"</span><button class="code-copy" type="button">Copy</button></div>"#,
        );
        if let Some(lang) = lang {
            write!(
                self.output,
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                escape_html(lang),
                escape_html(content)
            )
            .unwrap();
        } else {
            write!(
                self.output,
                "<pre><code>{}</code></pre>",
                escape_html(content)
            )
            .unwrap();
        }
        self.output.push_str("</div>");
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.heading.is_active() {
            self.heading.push_text(code);
            write!(
                self.heading.html_buffer(),
                r#"<code class="inline-code">{}</code>"#,
                escape_html(code)
            )
            .unwrap();
        } else {
            write!(
                self.output,
                r#"<code class="inline-code">{}</code>"#,
                escape_html(code)
            )
            .unwrap();
        }
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else {
            self.output.push('\n');
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        self.output.push_str(if checked {
            r#"<input type="checkbox" checked disabled>"#
        } else {
            r#"<input type="checkbox" disabled>"#
        });
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
