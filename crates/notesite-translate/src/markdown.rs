//! Markdown translation with front-matter support.
//!
//! Recognises the three common front-matter dialects at the very start of
//! a document: `---` fenced YAML, `+++` fenced TOML, and a leading JSON
//! object. A `title` field becomes an H1 heading and a `date` field a
//! plain line above the body, so authored metadata survives conversion.

use std::path::Path;
use std::sync::LazyLock;

use pulldown_cmark::{Options, Parser, html};
use regex::Regex;

use crate::TranslateError;

static YAML_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\n(.*?)---\n").unwrap());
static TOML_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A\+\+\+\n(.*?)\+\+\+\n").unwrap());
static JSON_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A(\{.*?\})\n").unwrap());

/// Front-matter fields the translator cares about.
#[derive(Debug, Default, PartialEq, Eq)]
struct FrontMatter {
    title: Option<String>,
    date: Option<String>,
}

/// Translate a markdown file to HTML.
pub(crate) fn translate(path: &Path) -> Result<Vec<u8>, TranslateError> {
    let text = crate::read_text(path)?;
    let (body, header) = split_front_matter(&text);

    let mut source = String::with_capacity(body.len() + 64);
    if let Some(header) = header {
        if let Some(title) = &header.title {
            source.push_str("# ");
            source.push_str(title);
            source.push('\n');
        }
        if let Some(date) = &header.date {
            source.push_str(date);
            source.push('\n');
        }
        if !source.is_empty() {
            source.push('\n');
        }
    }
    source.push_str(body);

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(&source, options);

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    Ok(out.into_bytes())
}

/// Split a leading front-matter block off the document.
///
/// Returns the remaining body and the parsed header, if any. A block that
/// is present but unparsable is left in place and treated as body text.
fn split_front_matter(text: &str) -> (&str, Option<FrontMatter>) {
    if let Some(caps) = YAML_HEADER.captures(text) {
        let whole = caps.get(0).unwrap();
        if let Some(header) = parse_yaml(&caps[1]) {
            return (&text[whole.end()..], Some(header));
        }
    } else if let Some(caps) = TOML_HEADER.captures(text) {
        let whole = caps.get(0).unwrap();
        if let Some(header) = parse_toml(&caps[1]) {
            return (&text[whole.end()..], Some(header));
        }
    } else if let Some(caps) = JSON_HEADER.captures(text) {
        let whole = caps.get(0).unwrap();
        if let Some(header) = parse_json(&caps[1]) {
            return (&text[whole.end()..], Some(header));
        }
    }
    (text, None)
}

fn parse_yaml(source: &str) -> Option<FrontMatter> {
    let value: serde_yaml::Value = serde_yaml::from_str(source).ok()?;
    value.as_mapping()?;
    Some(FrontMatter {
        title: value
            .get("title")
            .and_then(serde_yaml::Value::as_str)
            .map(str::to_owned),
        date: value
            .get("date")
            .and_then(serde_yaml::Value::as_str)
            .map(str::to_owned),
    })
}

fn parse_toml(source: &str) -> Option<FrontMatter> {
    let table: toml::Table = toml::from_str(source).ok()?;
    let date = match table.get("date") {
        Some(toml::Value::String(s)) => Some(s.clone()),
        Some(toml::Value::Datetime(d)) => Some(d.to_string()),
        _ => None,
    };
    Some(FrontMatter {
        title: table
            .get("title")
            .and_then(toml::Value::as_str)
            .map(str::to_owned),
        date,
    })
}

fn parse_json(source: &str) -> Option<FrontMatter> {
    let value: serde_json::Value = serde_json::from_str(source).ok()?;
    let map = value.as_object()?;
    Some(FrontMatter {
        title: map
            .get("title")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
        date: map
            .get("date")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn render(content: &str) -> String {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.md");
        fs::write(&path, content).unwrap();
        String::from_utf8(translate(&path).unwrap()).unwrap()
    }

    #[test]
    fn test_plain_markdown() {
        let html = render("# Hello\n\nWorld");

        assert!(html.contains("<h1>Hello</h1>"));
        assert!(html.contains("<p>World</p>"));
    }

    #[test]
    fn test_gfm_table() {
        let html = render("| a | b |\n|---|---|\n| 1 | 2 |\n");

        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_yaml_front_matter_becomes_heading() {
        let html = render("---\ntitle: My Note\ndate: \"2024-03-01\"\n---\nBody");

        assert!(html.contains("<h1>My Note</h1>"));
        assert!(html.contains("2024-03-01"));
        assert!(html.contains("<p>Body</p>"));
        assert!(!html.contains("---"));
    }

    #[test]
    fn test_toml_front_matter_becomes_heading() {
        let html = render("+++\ntitle = \"Other Note\"\n+++\nBody");

        assert!(html.contains("<h1>Other Note</h1>"));
        assert!(!html.contains("+++"));
    }

    #[test]
    fn test_json_front_matter_becomes_heading() {
        let html = render("{\"title\": \"Json Note\"}\nBody");

        assert!(html.contains("<h1>Json Note</h1>"));
    }

    #[test]
    fn test_unparsable_front_matter_stays_in_body() {
        let html = render("---\n[unclosed\n---\nBody");

        // The fence is left in place and rendered as ordinary markdown.
        assert!(html.contains("Body"));
    }

    #[test]
    fn test_front_matter_without_title_keeps_body_only() {
        let html = render("---\ndraft: true\n---\n# Real Heading\n");

        assert!(html.contains("<h1>Real Heading</h1>"));
    }

    #[test]
    fn test_split_front_matter_yaml() {
        let (body, header) = split_front_matter("---\ntitle: X\n---\nrest");

        assert_eq!(body, "rest");
        assert_eq!(header.unwrap().title.as_deref(), Some("X"));
    }

    #[test]
    fn test_split_front_matter_absent() {
        let (body, header) = split_front_matter("just text");

        assert_eq!(body, "just text");
        assert!(header.is_none());
    }
}
