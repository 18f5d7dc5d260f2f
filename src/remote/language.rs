// src/remote/language.rs
//! Google Cloud Natural Language (REST v1) client.
//!
//! Uses `documents:analyzeEntitySentiment` for entities and
//! `documents:analyzeSentiment` for whole-message sentiment. Auth is an API key
//! passed as the `key` query parameter.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{
    build_http, ensure_success, DocumentSentiment, Entity, EntityAnalyzer, EntityType, Sentiment,
    SentimentAnalyzer,
};
use crate::error::RemoteError;

const SERVICE: &str = "language";

pub const DEFAULT_LANGUAGE_BASE_URL: &str = "https://language.googleapis.com/v1";

pub struct LanguageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LanguageClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            http: build_http(SERVICE, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn post<R: DeserializeOwned>(
        &self,
        method: &str,
        text: &str,
    ) -> Result<R, RemoteError> {
        if self.api_key.is_empty() {
            return Err(RemoteError::Config {
                service: SERVICE,
                message: "missing API key".to_string(),
            });
        }

        let req = AnalyzeRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: text,
            },
            encoding_type: "UTF8",
        };

        let resp = self
            .http
            .post(format!("{}/documents:{method}", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                service: SERVICE,
                source,
            })?;

        let resp = ensure_success(SERVICE, resp).await?;
        resp.json::<R>().await.map_err(|e| RemoteError::Decode {
            service: SERVICE,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl EntityAnalyzer for LanguageClient {
    async fn analyze_entities(&self, text: &str) -> Result<Vec<Entity>, RemoteError> {
        let body: EntitySentimentResponse = self.post("analyzeEntitySentiment", text).await?;
        Ok(body.entities.into_iter().map(Entity::from).collect())
    }
}

#[async_trait]
impl SentimentAnalyzer for LanguageClient {
    async fn analyze_sentiment(&self, text: &str) -> Result<DocumentSentiment, RemoteError> {
        let body: SentimentResponse = self.post("analyzeSentiment", text).await?;
        let s = body.document_sentiment.unwrap_or_default();
        Ok(DocumentSentiment {
            language: body.language.unwrap_or_default(),
            score: s.score,
            magnitude: s.magnitude,
        })
    }
}

// ------------------------------------------------------------
// Wire types
// ------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    document: Document<'a>,
    encoding_type: &'static str,
}

#[derive(Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct EntitySentimentResponse {
    #[serde(default)]
    entities: Vec<WireEntity>,
}

#[derive(Deserialize)]
struct WireEntity {
    name: String,
    #[serde(rename = "type", default = "unknown_type")]
    kind: String,
    #[serde(default)]
    mentions: Vec<serde_json::Value>,
    #[serde(default)]
    sentiment: Option<Sentiment>,
}

fn unknown_type() -> String {
    "UNKNOWN".to_string()
}

impl From<WireEntity> for Entity {
    fn from(w: WireEntity) -> Self {
        Entity {
            name: w.name,
            entity_type: EntityType::from(w.kind),
            mention_count: w.mentions.len(),
            sentiment: w.sentiment.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentimentResponse {
    #[serde(default)]
    document_sentiment: Option<Sentiment>,
    #[serde(default)]
    language: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_entity_counts_mentions() {
        let raw = r#"{
            "entities": [
                {"name": "phone", "type": "CONSUMER_GOOD", "salience": 0.7,
                 "mentions": [{"text": {"content": "phone"}}, {"text": {"content": "it"}}],
                 "sentiment": {"magnitude": 0.9, "score": 0.9}},
                {"name": "I", "type": "PERSON", "mentions": [{}]}
            ],
            "language": "en"
        }"#;
        let body: EntitySentimentResponse = serde_json::from_str(raw).unwrap();
        let out: Vec<Entity> = body.entities.into_iter().map(Entity::from).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].mention_count, 2);
        assert_eq!(out[0].entity_type, EntityType::ConsumerGood);
        assert!((out[0].sentiment.score - 0.9).abs() < 1e-6);
        assert_eq!(out[1].sentiment, Sentiment::default());
    }

    #[test]
    fn missing_entities_is_empty() {
        let body: EntitySentimentResponse = serde_json::from_str(r#"{"language":"en"}"#).unwrap();
        assert!(body.entities.is_empty());
    }

    #[test]
    fn request_body_shape() {
        let req = AnalyzeRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: "hi",
            },
            encoding_type: "UTF8",
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["document"]["type"], "PLAIN_TEXT");
        assert_eq!(v["encodingType"], "UTF8");
    }
}
