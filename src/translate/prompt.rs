// src/translate/prompt.rs
//! Prompt text sent to the generative model.
//!
//! The model is asked to answer with `[e1:e2:...]`; `parser::parse_emojis`
//! relies on that shape. Keep the two in sync.

use std::fmt::Write as _;

use super::catalog::EmojiCatalogEntry;
use crate::remote::Entity;

const PREAMBLE: &str = "I have a list of phrases, and I need you to map each phrase to the most fitting emoji \
based on its meaning. Below are the lists of phrases and emojis with their descriptions. \
Your task is to strictly assign each phrase to a single emoji that best matches its meaning. \
The result should be a list of emojis separated by colons.";

const CLOSING: &str = "Please return the result as a list of emojis separated by colons \
and enclosed in square brackets (e.g., [😊:😢:🎉:🚀:🏆]).";

/// `"{n}. {name} ({type})"` per entity, 1-indexed, newline-terminated.
pub fn phrase_section(entities: &[Entity]) -> String {
    let mut out = String::new();
    for (i, e) in entities.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, e.name, e.entity_type);
    }
    out
}

/// `"{n}. {code} - {description}"` per catalog entry, 1-indexed, newline-terminated.
pub fn emoji_section(catalog: &[EmojiCatalogEntry]) -> String {
    let mut out = String::new();
    for (i, c) in catalog.iter().enumerate() {
        let _ = writeln!(out, "{}. {} - {}", i + 1, c.code, c.description);
    }
    out
}

/// Full instruction for the model. Pure: same inputs, same bytes.
pub fn build_prompt(entities: &[Entity], catalog: &[EmojiCatalogEntry]) -> String {
    format!(
        "{PREAMBLE}\n\n**List of Phrases:**\n{}\n**List of Emojis:**\n{}\n{CLOSING}",
        phrase_section(entities),
        emoji_section(catalog),
    )
}
