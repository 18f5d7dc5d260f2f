// src/remote/gemini.rs
//! Generative completion via Gemini.
//!
//! Two endpoint flavours:
//! - Vertex AI `streamGenerateContent` (bearer access token). Without `alt=sse`
//!   the body is a JSON array of response chunks.
//! - Generative Language API `generateContent` (API key). Single response object.
//!
//! Either way the completion is the concatenation of the first candidate's text
//! parts across all chunks.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_http, ensure_success, TextGenerator};
use crate::error::RemoteError;

const SERVICE: &str = "gemini";

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, PartialEq)]
pub enum GeminiEndpoint {
    Vertex {
        /// e.g. `https://us-central1-aiplatform.googleapis.com/v1`
        base_url: String,
        project: String,
        location: String,
        publisher: String,
        model: String,
        access_token: String,
    },
    Studio {
        base_url: String,
        model: String,
        api_key: String,
    },
}

impl GeminiEndpoint {
    fn url(&self) -> String {
        match self {
            GeminiEndpoint::Vertex {
                base_url,
                project,
                location,
                publisher,
                model,
                ..
            } => format!(
                "{}/projects/{project}/locations/{location}/publishers/{publisher}/models/{model}:streamGenerateContent",
                base_url.trim_end_matches('/')
            ),
            GeminiEndpoint::Studio {
                base_url, model, ..
            } => format!(
                "{}/models/{model}:generateContent",
                base_url.trim_end_matches('/')
            ),
        }
    }

    fn credential(&self) -> &str {
        match self {
            GeminiEndpoint::Vertex { access_token, .. } => access_token,
            GeminiEndpoint::Studio { api_key, .. } => api_key,
        }
    }
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.4,
            top_p: 1.0,
            top_k: 32,
            max_output_tokens: 2048,
        }
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: GeminiEndpoint,
    params: GenerationParams,
}

impl GeminiClient {
    pub fn new(
        endpoint: GeminiEndpoint,
        params: GenerationParams,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            http: build_http(SERVICE, timeout)?,
            endpoint,
            params,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, RemoteError> {
        if self.endpoint.credential().is_empty() {
            return Err(RemoteError::Config {
                service: SERVICE,
                message: "missing credentials".to_string(),
            });
        }

        let req = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![PartOut { text: prompt }],
            }],
            generation_config: self.params,
        };

        let builder = self.http.post(self.endpoint.url()).json(&req);
        let builder = match &self.endpoint {
            GeminiEndpoint::Vertex { access_token, .. } => builder.bearer_auth(access_token),
            GeminiEndpoint::Studio { api_key, .. } => {
                builder.query(&[("key", api_key.as_str())])
            }
        };

        let resp = builder
            .send()
            .await
            .map_err(|source| RemoteError::Transport {
                service: SERVICE,
                source,
            })?;
        let resp = ensure_success(SERVICE, resp).await?;
        let raw = resp.text().await.map_err(|source| RemoteError::Transport {
            service: SERVICE,
            source,
        })?;

        collect_text(&raw)
    }
}

/// Concatenate the first candidate's parts from either a single response
/// object or a JSON array of streamed chunks.
pub(crate) fn collect_text(raw: &str) -> Result<String, RemoteError> {
    let body: Chunks = serde_json::from_str(raw).map_err(|e| RemoteError::Decode {
        service: SERVICE,
        message: e.to_string(),
    })?;

    let chunks = match body {
        Chunks::Many(v) => v,
        Chunks::One(c) => vec![c],
    };

    let mut full = String::new();
    for chunk in chunks {
        let Some(candidate) = chunk.candidates.into_iter().next() else {
            continue;
        };
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(t) = part.text {
                full.push_str(&t);
            }
        }
    }
    Ok(full)
}

// ------------------------------------------------------------
// Wire types
// ------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationParams,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<PartOut<'a>>,
}

#[derive(Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Chunks {
    Many(Vec<Chunk>),
    One(Chunk),
}

#[derive(Deserialize)]
struct Chunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Deserialize)]
struct PartIn {
    #[serde(default)]
    text: Option<String>,
}
