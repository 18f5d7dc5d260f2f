// src/translate/catalog.rs
//! Emoji catalog loaded from a loosely delimited text resource.
//!
//! One entry per line. The code is everything before the first `,`; the
//! description is everything after the last `:`. A description containing a
//! `:` or a code containing a `,` will be cut. Lines are otherwise taken
//! verbatim (no trimming) apart from a trailing `\r`. Blank lines are skipped.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmojiCatalogEntry {
    pub code: String,
    pub description: String,
}

impl EmojiCatalogEntry {
    /// Parse one resource line.
    pub fn parse_line(line: &str) -> Self {
        let code = line.split(',').next().unwrap_or_default();
        let description = line.rsplit(':').next().unwrap_or_default();
        Self {
            code: code.to_string(),
            description: description.to_string(),
        }
    }
}

/// Read-only, insertion-ordered list of catalog entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmojiCatalog {
    entries: Vec<EmojiCatalogEntry>,
}

impl EmojiCatalog {
    pub fn new(entries: Vec<EmojiCatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn parse(content: &str) -> Self {
        let entries = content
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .filter(|l| !l.is_empty())
            .map(EmojiCatalogEntry::parse_line)
            .collect();
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn entries(&self) -> &[EmojiCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_comma_and_last_colon() {
        let e = EmojiCatalogEntry::parse_line("😊,happy:a smiling face");
        assert_eq!(e.code, "😊");
        assert_eq!(e.description, "a smiling face");
    }

    #[test]
    fn fragile_delimiters_are_replicated() {
        // Description with a colon loses its head.
        let e = EmojiCatalogEntry::parse_line("⏰,clock:time: late");
        assert_eq!(e.code, "⏰");
        assert_eq!(e.description, " late");

        // No colon at all: the whole line is the description.
        let e = EmojiCatalogEntry::parse_line("🎉,party");
        assert_eq!(e.code, "🎉");
        assert_eq!(e.description, "🎉,party");
    }

    #[test]
    fn parse_keeps_order_and_skips_blank_lines() {
        let cat = EmojiCatalog::parse("😊,happy:smile\r\n\n😢,sad:tear\n");
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.entries()[0].code, "😊");
        assert_eq!(cat.entries()[1].description, "tear");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = EmojiCatalog::load(Path::new("__no_such_catalog__.csv")).unwrap_err();
        assert!(err.to_string().contains("__no_such_catalog__.csv"));
    }
}
