use std::time::Duration;

use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::error::TranslateError;
use crate::translate::Translation;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Fails if a recorder is already installed.
    pub fn init() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Process-wide instance; installs the recorder on first use.
    pub fn shared() -> anyhow::Result<&'static Metrics> {
        static SHARED: OnceCell<Metrics> = OnceCell::new();
        SHARED.get_or_try_init(Metrics::init)
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("telegram_updates_total", "Telegram messages handled, by outcome.");
        describe_counter!("emoji_translations_total", "Successful text-to-emoji translations.");
        describe_counter!(
            "emoji_translation_failures_total",
            "Failed translations, by failing stage."
        );
        describe_counter!(
            "emoji_parse_miss_total",
            "Model replies without a bracketed emoji list."
        );
        describe_histogram!("emoji_translate_ms", "End-to-end translation time in milliseconds.");
    });
}

pub fn record_update(outcome: &'static str) {
    counter!("telegram_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_translation(res: &Result<Translation, TranslateError>, elapsed: Duration) {
    histogram!("emoji_translate_ms").record(elapsed.as_secs_f64() * 1000.0);
    match res {
        Ok(t) => {
            counter!("emoji_translations_total").increment(1);
            if t.is_parse_miss() {
                counter!("emoji_parse_miss_total").increment(1);
            }
        }
        Err(e) => {
            counter!("emoji_translation_failures_total", "stage" => e.stage()).increment(1);
        }
    }
}
