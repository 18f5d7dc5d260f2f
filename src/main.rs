//! Emoji translator bot: binary entrypoint.
//! Boots the Axum HTTP server (Telegram webhook + JSON API + metrics).
//!
//! For local runs without a public URL use the `poll_bot` binary instead.

use emoji_translator_bot::metrics::Metrics;
use emoji_translator_bot::BotRuntime;
use shuttle_axum::ShuttleAxum;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bot=info,api=info,warn"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let runtime = BotRuntime::from_default_config()?;
    if let Err(e) = runtime.register_webhook().await {
        warn!(target: "bot", error = ?e, "webhook registration failed; continuing");
    }

    let metrics = Metrics::shared()?;
    let router = runtime.router().merge(metrics.router());

    Ok(router.into())
}
