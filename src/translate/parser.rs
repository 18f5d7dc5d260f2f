// src/translate/parser.rs
//! Pulls the `[a:b:c]` answer out of free-form model output.
//!
//! First match wins, the captured text is split on `:` verbatim, and output
//! without any bracketed region yields an empty sequence instead of an error.

use once_cell::sync::Lazy;
use regex::Regex;

// Lazy, non-greedy; `.` does not cross newlines.
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*?)\]").expect("bracket regex"));

pub fn parse_emojis(model_output: &str) -> Vec<String> {
    let Some(caps) = BRACKETED.captures(model_output) else {
        return Vec::new();
    };
    caps.get(1)
        .map(|m| m.as_str().split(':').map(str::to_string).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_noise() {
        assert_eq!(
            parse_emojis("noise [😊:😢:🎉] trailing"),
            vec!["😊", "😢", "🎉"]
        );
    }

    #[test]
    fn no_brackets_is_empty() {
        assert!(parse_emojis("no brackets here").is_empty());
        assert!(parse_emojis("").is_empty());
        assert!(parse_emojis("unclosed [😊:😢").is_empty());
    }

    #[test]
    fn first_match_wins_and_entries_are_verbatim() {
        assert_eq!(
            parse_emojis("[ 😊 : 😢 ] and later [🎉]"),
            vec![" 😊 ", " 😢 "]
        );
    }

    #[test]
    fn empty_brackets_yield_one_empty_entry() {
        assert_eq!(parse_emojis("[]"), vec![""]);
    }

    #[test]
    fn does_not_span_lines() {
        assert_eq!(parse_emojis("[\n😊]\n[🚀:🏆]"), vec!["🚀", "🏆"]);
    }
}
