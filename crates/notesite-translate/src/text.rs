//! Plain-text translation.
//!
//! Escapes HTML metacharacters and preserves the original layout by
//! substituting non-breaking spaces and `<br />` line breaks, so a text
//! note reads the same in the browser as in the editor.

use std::path::Path;

use crate::TranslateError;

/// Translate a text file to display-safe HTML.
pub(crate) fn translate(path: &Path) -> Result<Vec<u8>, TranslateError> {
    let text = crate::read_text(path)?;
    Ok(escape(&text).into_bytes())
}

/// Escape HTML metacharacters and whitespace.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            ' ' => out.push_str("&nbsp;"),
            '\n' => out.push_str("<br />"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_escape_metacharacters() {
        assert_eq!(escape("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_escape_preserves_layout() {
        assert_eq!(escape("a b\nc"), "a&nbsp;b<br />c");
    }

    #[test]
    fn test_escape_ampersand_first() {
        // "&lt;" in the input must not double-escape into "&amp;lt;...".
        assert_eq!(escape("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_translate_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "x > y").unwrap();

        let html = String::from_utf8(translate(&path).unwrap()).unwrap();

        assert_eq!(html, "x&nbsp;&gt;&nbsp;y");
    }
}
