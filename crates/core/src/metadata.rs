//! Document metadata from leading `key: value` lines.
//!
//! ```text
//! author: Jane
//! date: 2024
//!
//! # First slide
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lower-cased key to trimmed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    /// Parse the metadata header of a document.
    pub fn parse(text: &str) -> Self {
        split_header(text).0
    }

    /// Value for a key (keys are stored lower-cased).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Insert an entry, normalizing the key and value.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.trim().to_lowercase(), value.trim().to_string());
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no metadata was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `author` value, empty when absent.
    pub fn author(&self) -> &str {
        self.get("author").unwrap_or("")
    }

    /// The `date` value, empty when absent.
    pub fn date(&self) -> &str {
        self.get("date").unwrap_or("")
    }

    /// Subtitle text built from author and date.
    ///
    /// `"{author} | {date}"` when both are present, otherwise whichever one
    /// is non-empty, or `None` when neither is.
    pub fn byline(&self) -> Option<String> {
        match (self.author(), self.date()) {
            ("", "") => None,
            (author, "") => Some(author.to_string()),
            ("", date) => Some(date.to_string()),
            (author, date) => Some(format!("{} | {}", author, date)),
        }
    }
}

/// Split a document into its metadata header and the remaining text.
///
/// Header lines are contiguous lines containing a `:`. The header ends at the
/// first blank line or the first line without a `:`; the terminating line
/// belongs to the remainder. Every header line is recorded, but only the
/// leading run whose keys are bare identifiers is cut from the text, so a
/// line like `# Agenda: Q3` stays in the remainder.
pub fn split_header(text: &str) -> (Metadata, &str) {
    let mut metadata = Metadata::default();
    let mut offset = 0;
    let mut stripping = true;

    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            break;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                metadata.insert(key, value);
                stripping = stripping && is_header_key(key);
                if stripping {
                    offset += raw_line.len();
                }
            }
            None => break,
        }
    }

    (metadata, &text[offset..])
}

/// A key like `author` or `last-updated`: no spaces, no Markdown marker in front.
fn is_header_key(key: &str) -> bool {
    let key = key.trim();
    key.starts_with(|c: char| c.is_alphanumeric() || c == '_')
        && !key.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_author_and_date() {
        let metadata = Metadata::parse("author: Jane\ndate: 2024\n\n# Slides");
        assert_eq!(metadata.author(), "Jane");
        assert_eq!(metadata.date(), "2024");
        assert_eq!(metadata.byline(), Some("Jane | 2024".to_string()));
    }

    #[test]
    fn test_keys_lowercased_values_trimmed() {
        let metadata = Metadata::parse("  Author :   Jane Doe  \nVenue: Hall A");
        assert_eq!(metadata.get("author"), Some("Jane Doe"));
        assert_eq!(metadata.get("VENUE"), Some("Hall A"));
        assert_eq!(metadata.len(), 2);
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let metadata = Metadata::parse("time: 10:30");
        assert_eq!(metadata.get("time"), Some("10:30"));
    }

    #[test]
    fn test_stops_at_blank_line() {
        let metadata = Metadata::parse("author: Jane\n\ndate: 2024");
        assert_eq!(metadata.author(), "Jane");
        assert_eq!(metadata.date(), "");
    }

    #[test]
    fn test_stops_at_line_without_colon() {
        let metadata = Metadata::parse("# Title\nauthor: Jane");
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_byline_precedence() {
        let mut metadata = Metadata::default();
        assert_eq!(metadata.byline(), None);
        metadata.insert("date", "2024");
        assert_eq!(metadata.byline(), Some("2024".to_string()));
        let mut metadata = Metadata::default();
        metadata.insert("author", "Jane");
        assert_eq!(metadata.byline(), Some("Jane".to_string()));
    }

    #[test]
    fn test_split_header_returns_remainder() {
        let (metadata, rest) = split_header("author: Jane\r\ndate: 2024\r\n\r\n# Intro\n");
        assert_eq!(metadata.len(), 2);
        assert_eq!(rest, "\r\n# Intro\n");

        let (metadata, rest) = split_header("# Intro\ntext");
        assert!(metadata.is_empty());
        assert_eq!(rest, "# Intro\ntext");
    }

    #[test]
    fn test_split_header_keeps_markdown_lines() {
        let (metadata, rest) = split_header("# Agenda: Q3\n\n- a\n");
        assert_eq!(metadata.get("# agenda"), Some("Q3"));
        assert_eq!(rest, "# Agenda: Q3\n\n- a\n");

        let (metadata, rest) = split_header("author: Jane\n> Note: read first\n\ntext");
        assert_eq!(metadata.author(), "Jane");
        assert_eq!(rest, "> Note: read first\n\ntext");

        let (_, rest) = split_header("last-updated: May\n\ntext");
        assert_eq!(rest, "\n\ntext");
    }

    #[test]
    fn test_is_header_key() {
        assert!(is_header_key(" Author "));
        assert!(is_header_key("last_updated"));
        assert!(!is_header_key("# Agenda"));
        assert!(!is_header_key("- item"));
        assert!(!is_header_key("Read this"));
        assert!(!is_header_key(""));
    }
}
