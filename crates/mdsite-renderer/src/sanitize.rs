//! HTML sanitization.
//!
//! Final pass over rendered HTML restricting output to a fixed allow-list of
//! tags and attributes. Disallowed tags are stripped rather than escaped;
//! script-like elements lose their content as well. This runs after every
//! render, unconditionally, as the last line of defense against markup
//! injected through content or front-matter.

use crate::state::escape_html;

/// Tags whose entire content is dropped along with the tag.
const DROP_CONTENT_TAGS: &[&str] = &["script", "style", "iframe", "object", "noscript"];

/// Sanitize rendered HTML against the tag/attribute allow-list.
#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let Some((consumed, tag)) = scan_tag(rest) else {
            // Not a parseable tag: escape the stray '<' and continue.
            out.push_str("&lt;");
            rest = &rest[1..];
            continue;
        };
        rest = &rest[consumed..];

        match tag {
            ParsedTag::Comment | ParsedTag::Declaration => {}
            ParsedTag::Close(name) => {
                if is_allowed_tag(&name) {
                    out.push_str("</");
                    out.push_str(&name);
                    out.push('>');
                }
            }
            ParsedTag::Open { name, attrs } => {
                if DROP_CONTENT_TAGS.contains(&name.as_str()) {
                    rest = skip_element_content(rest, &name);
                } else if is_allowed_tag(&name) {
                    emit_tag(&mut out, &name, &attrs);
                }
                // Disallowed tag: dropped, content kept.
            }
        }
    }

    out.push_str(rest);
    out
}

/// A scanned markup token.
enum ParsedTag {
    Open {
        name: String,
        attrs: Vec<(String, Option<String>)>,
    },
    Close(String),
    Comment,
    Declaration,
}

/// Scan one tag at the start of `input` (which begins with `<`).
///
/// Returns the number of bytes consumed and the parsed token, or `None` if
/// the text is not valid markup.
fn scan_tag(input: &str) -> Option<(usize, ParsedTag)> {
    if let Some(after) = input.strip_prefix("<!--") {
        // Unterminated comments swallow the remaining text.
        let end = after.find("-->").map_or(input.len(), |p| 4 + p + 3);
        return Some((end, ParsedTag::Comment));
    }
    if input.starts_with("<!") || input.starts_with("<?") {
        let end = input.find('>').map_or(input.len(), |p| p + 1);
        return Some((end, ParsedTag::Declaration));
    }

    let mut chars = input.char_indices().skip(1).peekable();
    let mut closing = false;
    if let Some((_, '/')) = chars.peek() {
        closing = true;
        chars.next();
    }

    // Tag name
    let mut name = String::new();
    while let Some((_, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
            chars.next();
        } else {
            break;
        }
    }
    if name.is_empty() {
        return None;
    }

    // Attributes
    let mut attrs = Vec::new();
    loop {
        // Skip whitespace and stray slashes
        while let Some((_, c)) = chars.peek() {
            if c.is_whitespace() || *c == '/' {
                chars.next();
            } else {
                break;
            }
        }

        match chars.peek() {
            None => return None, // No closing '>'
            Some((i, '>')) => {
                let end = i + 1;
                chars.next();
                let tag = if closing {
                    ParsedTag::Close(name)
                } else {
                    ParsedTag::Open { name, attrs }
                };
                return Some((end, tag));
            }
            Some(_) => {}
        }

        // Attribute name
        let mut attr_name = String::new();
        while let Some((_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || *c == '-' || *c == '_' || *c == ':' {
                attr_name.push(c.to_ascii_lowercase());
                chars.next();
            } else {
                break;
            }
        }
        if attr_name.is_empty() {
            // Unparseable junk before '>': give up on this tag.
            return None;
        }

        // Optional value
        while let Some((_, c)) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else {
                break;
            }
        }
        let value = if let Some((_, '=')) = chars.peek() {
            chars.next();
            while let Some((_, c)) = chars.peek() {
                if c.is_whitespace() {
                    chars.next();
                } else {
                    break;
                }
            }
            let mut value = String::new();
            match chars.peek() {
                Some((_, quote @ ('"' | '\''))) => {
                    let quote = *quote;
                    chars.next();
                    let mut terminated = false;
                    for (_, c) in chars.by_ref() {
                        if c == quote {
                            terminated = true;
                            break;
                        }
                        value.push(c);
                    }
                    if !terminated {
                        return None;
                    }
                }
                _ => {
                    while let Some((_, c)) = chars.peek() {
                        if c.is_whitespace() || *c == '>' {
                            break;
                        }
                        value.push(*c);
                        chars.next();
                    }
                }
            }
            Some(value)
        } else {
            None
        };

        attrs.push((attr_name, value));
    }
}

/// Skip past the closing tag of a drop-content element.
fn skip_element_content<'a>(rest: &'a str, name: &str) -> &'a str {
    let close = format!("</{name}");
    let lower = rest.to_ascii_lowercase();
    if let Some(pos) = lower.find(&close) {
        match rest[pos..].find('>') {
            Some(end) => &rest[pos + end + 1..],
            None => "",
        }
    } else {
        ""
    }
}

/// Re-emit an allowed tag with only its allowed attributes.
fn emit_tag(out: &mut String, name: &str, attrs: &[(String, Option<String>)]) {
    out.push('<');
    out.push_str(name);
    for (attr, value) in attrs {
        if !is_allowed_attr(name, attr) {
            continue;
        }
        if let Some(value) = value {
            if is_url_attr(attr) && has_forbidden_scheme(value) {
                continue;
            }
            out.push(' ');
            out.push_str(attr);
            out.push_str("=\"");
            out.push_str(&escape_html(value));
            out.push('"');
        } else {
            out.push(' ');
            out.push_str(attr);
        }
    }
    out.push('>');
}

/// Check the tag allow-list.
fn is_allowed_tag(name: &str) -> bool {
    matches!(
        name,
        "h1" | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "p"
            | "a"
            | "img"
            | "strong"
            | "em"
            | "s"
            | "del"
            | "code"
            | "pre"
            | "ul"
            | "ol"
            | "li"
            | "dl"
            | "dt"
            | "dd"
            | "table"
            | "thead"
            | "tbody"
            | "tr"
            | "th"
            | "td"
            | "blockquote"
            | "hr"
            | "br"
            | "details"
            | "summary"
            | "div"
            | "span"
            | "button"
            | "input"
            | "sup"
            | "sub"
    )
}

/// Check the per-tag attribute allow-list.
fn is_allowed_attr(tag: &str, attr: &str) -> bool {
    match tag {
        "a" => matches!(attr, "href" | "title" | "target" | "rel"),
        "img" => matches!(
            attr,
            "src" | "alt" | "title" | "width" | "height" | "loading"
        ),
        "ol" => attr == "start",
        "div" | "span" | "code" | "pre" => attr == "class",
        "button" => matches!(attr, "class" | "type"),
        "input" => matches!(attr, "type" | "checked" | "disabled"),
        _ if tag.starts_with('h') && tag.len() == 2 => attr == "id",
        _ => false,
    }
}

/// Attributes whose values carry URLs and need scheme filtering.
fn is_url_attr(attr: &str) -> bool {
    matches!(attr, "href" | "src")
}

/// Reject scriptable URL schemes in raw-HTML attributes.
fn has_forbidden_scheme(value: &str) -> bool {
    let trimmed: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    trimmed.starts_with("javascript:") || trimmed.starts_with("vbscript:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_script_stripped_entirely() {
        assert_eq!(
            sanitize_html("<script>alert(1)</script><p>ok</p>"),
            "<p>ok</p>"
        );
    }

    #[test]
    fn test_style_content_dropped() {
        assert_eq!(sanitize_html("<style>p{color:red}</style>text"), "text");
    }

    #[test]
    fn test_unterminated_script_drops_rest() {
        assert_eq!(sanitize_html("<p>a</p><script>alert(1)"), "<p>a</p>");
    }

    #[test]
    fn test_disallowed_tag_keeps_content() {
        assert_eq!(sanitize_html("<custom>kept</custom>"), "kept");
        assert_eq!(sanitize_html("<video controls>x</video>"), "x");
    }

    #[test]
    fn test_disallowed_attribute_dropped() {
        assert_eq!(
            sanitize_html(r#"<p onclick="evil()">hi</p>"#),
            "<p>hi</p>"
        );
        assert_eq!(
            sanitize_html(r#"<img src="a.png" onerror="evil()">"#),
            r#"<img src="a.png">"#
        );
    }

    #[test]
    fn test_allowed_markup_unchanged() {
        let html = r#"<h2 id="faq">FAQ</h2><p><a href="/docs/a" title="t" target="_blank" rel="noreferrer noopener">x</a></p>"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_code_block_wrapper_survives() {
        let html = r#"<div class="code-block"><div class="code-block-header"><span class="code-block-lang">RUST</span><button class="code-copy" type="button">Copy</button></div><pre><code class="language-rust">fn main() {}</code></pre></div>"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_image_attributes_survive() {
        let html = r#"<img src="/api/assets/a.png" alt="A" width="24" height="16" loading="lazy">"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_task_list_input_survives() {
        let html = r#"<input type="checkbox" checked disabled>"#;
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_javascript_href_dropped() {
        assert_eq!(
            sanitize_html(r#"<a href="javascript:alert(1)">x</a>"#),
            "<a>x</a>"
        );
        assert_eq!(
            sanitize_html(r#"<a href="JaVa scRipt:alert(1)">x</a>"#),
            "<a>x</a>"
        );
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(sanitize_html("a<!-- hidden -->b"), "ab");
    }

    #[test]
    fn test_stray_angle_bracket_escaped() {
        assert_eq!(sanitize_html("1 < 2"), "1 &lt; 2");
    }

    #[test]
    fn test_details_summary_allowed() {
        let html = "<details><summary>More</summary><p>body</p></details>";
        assert_eq!(sanitize_html(html), html);
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(sanitize_html("no markup here"), "no markup here");
    }
}
