use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::error::TranslateError;
use crate::metrics::record_translation;
use crate::remote::Entity;
use crate::telegram::handler::anon_hash;
use crate::telegram::{BotHandler, Update};

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
pub struct AppState {
    pub handler: BotHandler,
    /// Empty disables the webhook secret check.
    pub webhook_secret: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/translate", post(translate))
        .route("/telegram/webhook", post(telegram_webhook))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct TranslateReq {
    text: String,
    #[serde(default)]
    count: Option<usize>,
}

#[derive(serde::Serialize)]
struct TranslateResp {
    entities: Vec<Entity>,
    emojis: Vec<String>,
    rendered: String,
}

#[derive(serde::Serialize)]
struct ErrorResp {
    error: String,
}

struct ApiError(TranslateError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TranslateError::EmptyInput => StatusCode::BAD_REQUEST,
            TranslateError::Remote(_) => StatusCode::BAD_GATEWAY,
            TranslateError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResp {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

async fn translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateReq>,
) -> Result<Json<TranslateResp>, ApiError> {
    let count = body
        .count
        .filter(|c| *c > 0)
        .unwrap_or_else(|| state.handler.default_count());

    let started = Instant::now();
    let res = state.handler.translator().translate(&body.text, count).await;
    record_translation(&res, started.elapsed());

    let id = anon_hash(&body.text);
    match res {
        Ok(t) => {
            info!(target: "api", %id, count, entities = t.entities.len(), emojis = t.emojis.len(), "translated");
            let rendered = t.render();
            Ok(Json(TranslateResp {
                entities: t.entities,
                emojis: t.emojis,
                rendered,
            }))
        }
        Err(e) => {
            warn!(target: "api", %id, error = %e, "translate failed");
            Err(ApiError(e))
        }
    }
}

async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    if !state.webhook_secret.is_empty() {
        let given = headers
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if given != state.webhook_secret {
            warn!(target: "api", update_id = update.update_id, "webhook secret mismatch");
            return StatusCode::UNAUTHORIZED;
        }
    }

    // Answer Telegram right away; the reply goes out through sendMessage.
    let handler = state.handler.clone();
    tokio::spawn(async move {
        handler.handle_update(&update).await;
    });
    StatusCode::OK
}
