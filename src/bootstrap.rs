// src/bootstrap.rs
//! Composition root: config → remote clients → translator → handler → router.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::bot::test_mode_mock;
use crate::config::{BotConfig, GenerationProvider};
use crate::remote::{
    DynEntityAnalyzer, DynSentimentAnalyzer, DynTextGenerator, Entity, GeminiClient,
    GeminiEndpoint, LanguageClient, StubAnalyzer, StubGenerator,
};
use crate::telegram::{BotHandler, TelegramClient};
use crate::translate::{EmojiCatalog, EmojiTranslator};

pub struct BotRuntime {
    pub cfg: BotConfig,
    pub telegram: TelegramClient,
    pub handler: BotHandler,
}

impl BotRuntime {
    pub fn from_config(cfg: BotConfig) -> anyhow::Result<Self> {
        let catalog = EmojiCatalog::load(&cfg.catalog_path)?;
        // Safe diagnostics: never log secrets, only their length
        info!(
            target: "bot",
            catalog_entries = catalog.len(),
            provider = ?cfg.generation.provider,
            model = %cfg.generation.model,
            token_len = cfg.telegram.token.len(),
            mock = test_mode_mock(),
            "bot config loaded"
        );
        if catalog.is_empty() {
            warn!(target: "bot", path = %cfg.catalog_path.display(), "emoji catalog is empty");
        }

        let (analyzer, sentiment, generator) = build_remote(&cfg)?;
        let translator = EmojiTranslator::new(analyzer.clone(), generator, Arc::new(catalog))
            .with_timeout(cfg.request_timeout());

        let telegram = TelegramClient::new(&cfg.telegram.token);
        let handler = BotHandler::new(
            translator,
            analyzer,
            sentiment,
            Arc::new(telegram.clone()),
            cfg.default_entity_count,
        );

        Ok(Self {
            cfg,
            telegram,
            handler,
        })
    }

    pub fn from_default_config() -> anyhow::Result<Self> {
        let cfg = BotConfig::load_default()?;
        Self::from_config(cfg)
    }

    pub fn router(&self) -> Router {
        api::router(AppState {
            handler: self.handler.clone(),
            webhook_secret: self.cfg.telegram.webhook_secret.clone(),
        })
    }

    /// Register the configured webhook URL with Telegram, if any.
    pub async fn register_webhook(&self) -> anyhow::Result<()> {
        let Some(url) = self.cfg.telegram.webhook_url.as_deref() else {
            return Ok(());
        };
        self.telegram
            .set_webhook(url, &self.cfg.telegram.webhook_secret)
            .await
            .context("setWebhook")?;
        info!(target: "bot", %url, "webhook registered");
        Ok(())
    }
}

/// Real Google clients, or fixed stubs when `BOT_TEST_MODE=mock`.
fn build_remote(
    cfg: &BotConfig,
) -> anyhow::Result<(DynEntityAnalyzer, DynSentimentAnalyzer, DynTextGenerator)> {
    if test_mode_mock() {
        let stub = Arc::new(StubAnalyzer::new(vec![
            Entity::new("phone", "CONSUMER_GOOD", 2),
            Entity::new("I", "PERSON", 1),
        ]));
        let analyzer: DynEntityAnalyzer = stub.clone();
        let sentiment: DynSentimentAnalyzer = stub;
        let gen: DynTextGenerator = Arc::new(StubGenerator::new("Sure! [📱:😍]"));
        return Ok((analyzer, sentiment, gen));
    }

    let timeout = cfg.request_timeout();
    let language = Arc::new(LanguageClient::new(
        cfg.language.base_url.clone(),
        cfg.language.api_key.clone(),
        timeout,
    )?);

    let g = &cfg.generation;
    let endpoint = match g.provider {
        GenerationProvider::Vertex => GeminiEndpoint::Vertex {
            base_url: g.resolved_base_url(),
            project: g.project.clone(),
            location: g.location.clone(),
            publisher: g.publisher.clone(),
            model: g.model.clone(),
            access_token: g.credential.clone(),
        },
        GenerationProvider::Studio => GeminiEndpoint::Studio {
            base_url: g.resolved_base_url(),
            model: g.model.clone(),
            api_key: g.credential.clone(),
        },
    };
    let gemini: DynTextGenerator = Arc::new(GeminiClient::new(endpoint, g.params, timeout)?);

    let analyzer: DynEntityAnalyzer = language.clone();
    let sentiment: DynSentimentAnalyzer = language;
    Ok((analyzer, sentiment, gemini))
}
