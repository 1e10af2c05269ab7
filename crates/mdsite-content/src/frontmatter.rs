//! YAML front-matter extraction.
//!
//! Documents may begin with a `---`-delimited YAML block carrying `title`,
//! `description` and `date`. Malformed YAML degrades to an empty record —
//! missing fields fall back through the content-derived precedence chain
//! downstream.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

/// Front-matter fields recognized at the top of a document.
///
/// All fields are optional. `date` accepts any YAML scalar since authors
/// write both quoted strings and bare dates.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    /// Document title (overrides heading extraction).
    #[serde(default)]
    pub title: Option<String>,

    /// Document description for navigation and search.
    #[serde(default)]
    pub description: Option<String>,

    /// Authoring date, normalized downstream to ISO `YYYY-MM-DD`.
    #[serde(default)]
    pub date: Option<serde_yaml::Value>,
}

/// Split a document into its front-matter and body.
///
/// The front-matter block is the region between a leading `---` line and the
/// next `---` line. Malformed YAML inside the block is logged and treated as
/// empty; text without a block is returned whole.
#[must_use]
pub fn split_front_matter(text: &str) -> (FrontMatter, &str) {
    let Some(rest) = strip_delimiter_line(text) else {
        return (FrontMatter::default(), text);
    };

    let Some((block, body)) = find_closing_delimiter(rest) else {
        return (FrontMatter::default(), text);
    };

    let matter = match serde_yaml::from_str::<FrontMatter>(block) {
        Ok(matter) => matter,
        Err(e) => {
            tracing::debug!(error = %e, "Malformed front-matter, ignoring");
            FrontMatter::default()
        }
    };

    (matter, body)
}

/// Normalize a front-matter date value to an ISO `YYYY-MM-DD` string.
///
/// Unparseable or absent dates yield an empty string.
#[must_use]
pub fn normalize_date(value: Option<&serde_yaml::Value>) -> String {
    let raw = match value {
        Some(serde_yaml::Value::String(s)) => s.trim().to_owned(),
        Some(serde_yaml::Value::Number(n)) => n.to_string(),
        _ => return String::new(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return dt.date_naive().to_string();
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&raw, format) {
            return date.to_string();
        }
    }

    String::new()
}

/// Strip a leading `---` delimiter line, returning the text after it.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\r').unwrap_or(rest);
    rest.strip_prefix('\n')
}

/// Find the closing `---` line, returning (block, body-after).
fn find_closing_delimiter(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&text[..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_front_matter() {
        let (matter, body) = split_front_matter("# Title\n\nBody");
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, "# Title\n\nBody");
    }

    #[test]
    fn test_full_front_matter() {
        let text = "---\ntitle: \"My Page\"\ndescription: Overview\ndate: 2024-03-01\n---\n# Heading\n";
        let (matter, body) = split_front_matter(text);
        assert_eq!(matter.title, Some("My Page".to_owned()));
        assert_eq!(matter.description, Some("Overview".to_owned()));
        assert_eq!(normalize_date(matter.date.as_ref()), "2024-03-01");
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn test_malformed_yaml_degrades() {
        let text = "---\ntitle: [unclosed\n---\nBody";
        let (matter, body) = split_front_matter(text);
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unterminated_block_treated_as_body() {
        let text = "---\ntitle: x\nno closing delimiter";
        let (matter, body) = split_front_matter(text);
        assert_eq!(matter, FrontMatter::default());
        assert_eq!(body, text);
    }

    #[test]
    fn test_crlf_delimiters() {
        let text = "---\r\ntitle: X\r\n---\r\nBody";
        let (matter, body) = split_front_matter(text);
        assert_eq!(matter.title, Some("X".to_owned()));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let text = "---\ntitle: X\ntags: [a, b]\n---\n";
        let (matter, _) = split_front_matter(text);
        assert_eq!(matter.title, Some("X".to_owned()));
    }

    #[test]
    fn test_normalize_date_rfc3339() {
        let value = serde_yaml::Value::String("2024-03-01T10:30:00Z".to_owned());
        assert_eq!(normalize_date(Some(&value)), "2024-03-01");
    }

    #[test]
    fn test_normalize_date_slash_format() {
        let value = serde_yaml::Value::String("2024/03/01".to_owned());
        assert_eq!(normalize_date(Some(&value)), "2024-03-01");
    }

    #[test]
    fn test_normalize_date_invalid_is_empty() {
        let value = serde_yaml::Value::String("next tuesday".to_owned());
        assert_eq!(normalize_date(Some(&value)), "");
        assert_eq!(normalize_date(None), "");
    }
}
