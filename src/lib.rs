// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod metrics;
pub mod remote;
pub mod telegram;
pub mod translate;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::bootstrap::BotRuntime;
pub use crate::error::{CatalogError, RemoteError, TelegramError, TranslateError};
pub use crate::translate::{EmojiTranslator, Translation};

use axum::Router;

/// Full in-process app: config from `$BOT_CONFIG_PATH` (or `config/bot.toml`),
/// API routes plus `/metrics`.
pub async fn app() -> anyhow::Result<Router> {
    let runtime = BotRuntime::from_default_config()?;
    let metrics = metrics::Metrics::shared()?;
    Ok(runtime.router().merge(metrics.router()))
}
