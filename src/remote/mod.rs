// src/remote/mod.rs
//! Remote collaborators: entity/sentiment analysis and generative completion.
//!
//! The pipeline only talks to the traits below. Concrete HTTP clients live in
//! `language` (Google Cloud Natural Language) and `gemini` (Vertex AI / Gemini API);
//! the stubs at the bottom return fixed data for tests and `BOT_TEST_MODE=mock`.

pub mod gemini;
pub mod language;

use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

pub use gemini::{GeminiClient, GeminiEndpoint, GenerationParams};
pub use language::LanguageClient;

/// Coarse entity category assigned by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    Unknown,
    Person,
    Location,
    Organization,
    Event,
    WorkOfArt,
    ConsumerGood,
    Other,
    PhoneNumber,
    Address,
    Date,
    Number,
    Price,
    /// Any category the service reports that we have no variant for.
    Custom(String),
}

impl EntityType {
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Unknown => "UNKNOWN",
            EntityType::Person => "PERSON",
            EntityType::Location => "LOCATION",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Event => "EVENT",
            EntityType::WorkOfArt => "WORK_OF_ART",
            EntityType::ConsumerGood => "CONSUMER_GOOD",
            EntityType::Other => "OTHER",
            EntityType::PhoneNumber => "PHONE_NUMBER",
            EntityType::Address => "ADDRESS",
            EntityType::Date => "DATE",
            EntityType::Number => "NUMBER",
            EntityType::Price => "PRICE",
            EntityType::Custom(s) => s,
        }
    }
}

impl From<&str> for EntityType {
    fn from(s: &str) -> Self {
        match s {
            "UNKNOWN" => EntityType::Unknown,
            "PERSON" => EntityType::Person,
            "LOCATION" => EntityType::Location,
            "ORGANIZATION" => EntityType::Organization,
            "EVENT" => EntityType::Event,
            "WORK_OF_ART" => EntityType::WorkOfArt,
            "CONSUMER_GOOD" => EntityType::ConsumerGood,
            "OTHER" => EntityType::Other,
            "PHONE_NUMBER" => EntityType::PhoneNumber,
            "ADDRESS" => EntityType::Address,
            "DATE" => EntityType::Date,
            "NUMBER" => EntityType::Number,
            "PRICE" => EntityType::Price,
            other => EntityType::Custom(other.to_string()),
        }
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        EntityType::from(s.as_str())
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub magnitude: f32,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "score: {:.2}, magnitude: {:.2}", self.score, self.magnitude)
    }
}

/// One entity as returned by the analysis service. Identified by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    #[serde(rename = "mentions")]
    pub mention_count: usize,
    pub sentiment: Sentiment,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<EntityType>, mentions: usize) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            mention_count: mentions,
            sentiment: Sentiment::default(),
        }
    }
}

/// Whole-document sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSentiment {
    pub language: String,
    pub score: f32,
    pub magnitude: f32,
}

#[async_trait]
pub trait EntityAnalyzer: Send + Sync {
    /// Entities found in `text`, in the order the service returned them.
    async fn analyze_entities(&self, text: &str) -> Result<Vec<Entity>, RemoteError>;
}

#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze_sentiment(&self, text: &str) -> Result<DocumentSentiment, RemoteError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Fully concatenated completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, RemoteError>;
}

pub type DynEntityAnalyzer = Arc<dyn EntityAnalyzer>;
pub type DynSentimentAnalyzer = Arc<dyn SentimentAnalyzer>;
pub type DynTextGenerator = Arc<dyn TextGenerator>;

/// Turn a non-2xx response into a `RemoteError`, keeping at most 512 chars of the body.
pub(crate) async fn ensure_success(
    service: &'static str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > 512 {
        let mut cut = 512;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(RemoteError::Quota { service, body });
    }
    Err(RemoteError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn build_http(
    service: &'static str,
    timeout: std::time::Duration,
) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .user_agent(concat!("emoji-translator-bot/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(std::time::Duration::from_secs(4))
        .timeout(timeout)
        .build()
        .map_err(|source| RemoteError::Transport { service, source })
}

// ------------------------------------------------------------
// Stubs
// ------------------------------------------------------------

/// Returns the same entities (and document sentiment) for every input.
#[derive(Debug, Clone)]
pub struct StubAnalyzer {
    pub entities: Vec<Entity>,
    pub sentiment: DocumentSentiment,
}

impl StubAnalyzer {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            sentiment: DocumentSentiment {
                language: "en".to_string(),
                score: 0.0,
                magnitude: 0.0,
            },
        }
    }
}

#[async_trait]
impl EntityAnalyzer for StubAnalyzer {
    async fn analyze_entities(&self, _text: &str) -> Result<Vec<Entity>, RemoteError> {
        Ok(self.entities.clone())
    }
}

#[async_trait]
impl SentimentAnalyzer for StubAnalyzer {
    async fn analyze_sentiment(&self, _text: &str) -> Result<DocumentSentiment, RemoteError> {
        Ok(self.sentiment.clone())
    }
}

/// Returns a fixed completion and remembers the prompts it was given.
#[derive(Debug, Default)]
pub struct StubGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RemoteError> {
        if let Ok(mut g) = self.prompts.lock() {
            g.push(prompt.to_string());
        }
        Ok(self.reply.clone())
    }
}

/// Always fails; handy for exercising error relay paths.
#[derive(Debug, Clone)]
pub struct FailingService {
    pub service: &'static str,
    pub status: u16,
}

#[async_trait]
impl EntityAnalyzer for FailingService {
    async fn analyze_entities(&self, _text: &str) -> Result<Vec<Entity>, RemoteError> {
        Err(self.error())
    }
}

#[async_trait]
impl SentimentAnalyzer for FailingService {
    async fn analyze_sentiment(&self, _text: &str) -> Result<DocumentSentiment, RemoteError> {
        Err(self.error())
    }
}

#[async_trait]
impl TextGenerator for FailingService {
    async fn generate(&self, _prompt: &str) -> Result<String, RemoteError> {
        Err(self.error())
    }
}

impl FailingService {
    fn error(&self) -> RemoteError {
        RemoteError::Status {
            service: self.service,
            status: self.status,
            body: "stubbed failure".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_type_keeps_unknown_categories_verbatim() {
        assert_eq!(EntityType::from("PERSON"), EntityType::Person);
        assert_eq!(
            EntityType::from("PRODUCT"),
            EntityType::Custom("PRODUCT".into())
        );
        assert_eq!(EntityType::from("PRODUCT").to_string(), "PRODUCT");
        assert_eq!(EntityType::WorkOfArt.to_string(), "WORK_OF_ART");
    }

    #[test]
    fn entity_serializes_with_wire_names() {
        let e = Entity::new("phone", "CONSUMER_GOOD", 2);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["name"], "phone");
        assert_eq!(v["type"], "CONSUMER_GOOD");
        assert_eq!(v["mentions"], 2);
    }

    #[tokio::test]
    async fn stub_generator_records_prompts() {
        let g = StubGenerator::new("[🙂]");
        let out = g.generate("hello").await.unwrap();
        assert_eq!(out, "[🙂]");
        assert_eq!(g.prompts(), vec!["hello".to_string()]);
    }
}
