//! Long-polling runner: no public URL needed. Ctrl-C stops polling and aborts
//! messages still in flight (their partial results are dropped).

use std::time::Duration;

use anyhow::Context;
use emoji_translator_bot::BotRuntime;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const POLL_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bot=info,warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let runtime = BotRuntime::from_default_config()?;
    let me = runtime.telegram.get_me().await.context("getMe")?;
    info!(
        target: "bot",
        username = me.username.as_deref().unwrap_or("?"),
        "start listening"
    );

    let mut offset: i64 = 0;
    let mut in_flight: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(target: "bot", pending = in_flight.len(), "shutting down");
                in_flight.abort_all();
                break;
            }
            res = runtime.telegram.get_updates(offset, POLL_TIMEOUT_SECS) => {
                match res {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            let handler = runtime.handler.clone();
                            in_flight.spawn(async move {
                                handler.handle_update(&update).await;
                            });
                        }
                    }
                    Err(e) => {
                        warn!(target: "bot", error = %e, "polling failed");
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            }
        }

        // Reap finished handlers so the set does not grow without bound.
        while let Some(done) = in_flight.try_join_next() {
            if let Err(e) = done {
                warn!(target: "bot", error = %e, "message task panicked");
            }
        }
    }

    while in_flight.join_next().await.is_some() {}
    Ok(())
}
