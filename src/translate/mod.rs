// src/translate/mod.rs
//! Text → entities → prompt → completion → emoji.
//!
//! `EmojiTranslator` owns the two remote collaborators and the catalog (read
//! once at construction). Each remote call is bounded by `timeout`; failures are
//! returned to the caller untouched. No logging and no retries happen here.

pub mod catalog;
pub mod parser;
pub mod prompt;
pub mod ranker;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::{RemoteError, TranslateError};
use crate::remote::{DynEntityAnalyzer, DynTextGenerator, Entity};

pub use catalog::{EmojiCatalog, EmojiCatalogEntry};
pub use parser::parse_emojis;
pub use prompt::build_prompt;
pub use ranker::select_entities;

pub const DEFAULT_ENTITY_COUNT: usize = 10;
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(20);

/// Ranked entities and the emoji the model picked for them.
///
/// `emojis.len()` usually equals `entities.len()` but the model is free to
/// disagree; an empty `emojis` means the reply had no bracketed list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub entities: Vec<Entity>,
    pub emojis: Vec<String>,
}

impl Translation {
    pub fn entity_line(&self) -> String {
        self.entities
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn emoji_line(&self) -> String {
        self.emojis.join(" ")
    }

    /// Names on the first line, emoji on the second.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.entity_line(), self.emoji_line())
    }

    pub fn is_parse_miss(&self) -> bool {
        self.emojis.is_empty()
    }
}

#[derive(Clone)]
pub struct EmojiTranslator {
    analyzer: DynEntityAnalyzer,
    generator: DynTextGenerator,
    catalog: Arc<EmojiCatalog>,
    timeout: Duration,
}

impl EmojiTranslator {
    pub fn new(
        analyzer: DynEntityAnalyzer,
        generator: DynTextGenerator,
        catalog: Arc<EmojiCatalog>,
    ) -> Self {
        Self {
            analyzer,
            generator,
            catalog,
            timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &EmojiCatalog {
        &self.catalog
    }

    /// Analyze `text` remotely and select up to `count` distinct entities.
    pub async fn rank_entities(
        &self,
        text: &str,
        count: usize,
    ) -> Result<Vec<Entity>, TranslateError> {
        if text.trim().is_empty() {
            return Err(TranslateError::EmptyInput);
        }
        let all = bounded("language", self.timeout, self.analyzer.analyze_entities(text)).await?;
        Ok(select_entities(&all, count))
    }

    /// Ask the model for one emoji per entity.
    pub async fn map_to_emojis(&self, entities: &[Entity]) -> Result<Vec<String>, TranslateError> {
        let prompt = build_prompt(entities, self.catalog.entries());
        let reply = bounded("gemini", self.timeout, self.generator.generate(&prompt)).await?;
        Ok(parse_emojis(&reply))
    }

    pub async fn translate(&self, text: &str, count: usize) -> Result<Translation, TranslateError> {
        let entities = self.rank_entities(text, count).await?;
        let emojis = self.map_to_emojis(&entities).await?;
        Ok(Translation { entities, emojis })
    }
}

async fn bounded<T>(
    service: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T, RemoteError>>,
) -> Result<T, RemoteError> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(res) => res,
        Err(_) => Err(RemoteError::Timeout { service, timeout }),
    }
}
