// src/config/bot.rs
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::remote::gemini::DEFAULT_GEMINI_BASE_URL;
use crate::remote::language::DEFAULT_LANGUAGE_BASE_URL;
use crate::remote::GenerationParams;
use crate::translate::{DEFAULT_ENTITY_COUNT, DEFAULT_REMOTE_TIMEOUT};

pub const DEFAULT_BOT_CONFIG_PATH: &str = "config/bot.toml";
pub const ENV_BOT_CONFIG_PATH: &str = "BOT_CONFIG_PATH";
pub const ENV_TEST_MODE: &str = "BOT_TEST_MODE";

pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_GOOGLE_ACCESS_TOKEN: &str = "GOOGLE_ACCESS_TOKEN";

fn default_entity_count() -> usize {
    DEFAULT_ENTITY_COUNT
}
fn default_timeout_secs() -> u64 {
    DEFAULT_REMOTE_TIMEOUT.as_secs()
}
fn default_catalog_path() -> PathBuf {
    PathBuf::from("config/emojis.csv")
}
fn default_env() -> String {
    "ENV".to_string()
}
fn default_language_base_url() -> String {
    DEFAULT_LANGUAGE_BASE_URL.to_string()
}
fn default_location() -> String {
    "us-central1".to_string()
}
fn default_publisher() -> String {
    "google".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub telegram: TelegramConfig,
    /// Entities asked for when a message does not say otherwise.
    #[serde(default = "default_entity_count")]
    pub default_entity_count: usize,
    /// Bound applied to each remote call.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default)]
    pub language: LanguageConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// "ENV" means: read from TELEGRAM_BOT_TOKEN
    #[serde(default = "default_env")]
    pub token: String,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` on webhook calls; empty disables the check.
    #[serde(default)]
    pub webhook_secret: String,
    /// Public URL registered with `setWebhook` at startup, if set.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    #[serde(default = "default_language_base_url")]
    pub base_url: String,
    /// "ENV" means: read from GOOGLE_API_KEY
    #[serde(default = "default_env")]
    pub api_key: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            base_url: default_language_base_url(),
            api_key: default_env(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    /// Vertex AI, bearer access token.
    Vertex,
    /// Generative Language API, API key.
    Studio,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub provider: GenerationProvider,
    #[serde(default = "default_model")]
    pub model: String,
    /// Vertex only.
    #[serde(default)]
    pub project: String,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_publisher")]
    pub publisher: String,
    /// Defaults per provider when absent.
    #[serde(default)]
    pub base_url: Option<String>,
    /// "ENV" means: GOOGLE_ACCESS_TOKEN for vertex, GOOGLE_API_KEY for studio
    #[serde(default = "default_env")]
    pub credential: String,
    #[serde(default)]
    pub params: GenerationParams,
}

impl GenerationConfig {
    pub fn resolved_base_url(&self) -> String {
        match (&self.base_url, self.provider) {
            (Some(u), _) => u.clone(),
            (None, GenerationProvider::Vertex) => {
                format!("https://{}-aiplatform.googleapis.com/v1", self.location)
            }
            (None, GenerationProvider::Studio) => DEFAULT_GEMINI_BASE_URL.to_string(),
        }
    }
}

impl BotConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading bot config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Load using env var + fallback:
    /// 1) $BOT_CONFIG_PATH
    /// 2) config/bot.toml
    pub fn load_default() -> anyhow::Result<Self> {
        let path = env::var(ENV_BOT_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_BOT_CONFIG_PATH));
        Self::load_from_file(path)
    }

    pub fn from_toml_str(data: &str) -> anyhow::Result<Self> {
        let mut cfg: BotConfig = toml::from_str(data).context("parsing bot config")?;
        let lenient = test_mode_mock();

        cfg.telegram.token = resolve_secret(&cfg.telegram.token, ENV_TELEGRAM_TOKEN, lenient)?;
        cfg.language.api_key = resolve_secret(&cfg.language.api_key, ENV_GOOGLE_API_KEY, lenient)?;
        let cred_var = match cfg.generation.provider {
            GenerationProvider::Vertex => ENV_GOOGLE_ACCESS_TOKEN,
            GenerationProvider::Studio => ENV_GOOGLE_API_KEY,
        };
        cfg.generation.credential = resolve_secret(&cfg.generation.credential, cred_var, lenient)?;

        if cfg.generation.provider == GenerationProvider::Vertex
            && cfg.generation.project.trim().is_empty()
            && !lenient
        {
            bail!("generation.project is required for the vertex provider");
        }

        // Sanitize
        if cfg.default_entity_count == 0 {
            cfg.default_entity_count = default_entity_count();
        }
        if cfg.request_timeout_secs == 0 {
            cfg.request_timeout_secs = default_timeout_secs();
        }
        if !(0.0..=2.0).contains(&cfg.generation.params.temperature) {
            cfg.generation.params.temperature = GenerationParams::default().temperature;
        }

        Ok(cfg)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// `BOT_TEST_MODE=mock` swaps remote clients for stubs and tolerates missing secrets.
pub fn test_mode_mock() -> bool {
    env::var(ENV_TEST_MODE)
        .map(|v| v == "mock")
        .unwrap_or(false)
}

fn resolve_secret(raw: &str, var: &str, lenient: bool) -> anyhow::Result<String> {
    if !raw.trim().eq_ignore_ascii_case("env") {
        return Ok(raw.to_string());
    }
    match env::var(var) {
        Ok(v) => Ok(v),
        Err(_) if lenient => Ok(String::new()),
        Err(_) => Err(anyhow!("Missing {var} env var")),
    }
}
