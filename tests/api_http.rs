// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /translate (ok, empty text, remote failure)
// - POST /telegram/webhook (secret check, reply delivered through the sink)

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use emoji_translator_bot::api::{self, AppState, SECRET_HEADER};
use emoji_translator_bot::error::TelegramError;
use emoji_translator_bot::remote::{
    DynEntityAnalyzer, DynTextGenerator, Entity, FailingService, StubAnalyzer, StubGenerator,
};
use emoji_translator_bot::telegram::{BotHandler, ReplySink};
use emoji_translator_bot::translate::{EmojiCatalog, EmojiTranslator};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

#[derive(Default)]
struct Recorder {
    sent: Mutex<Vec<(i64, String)>>,
}

#[async_trait::async_trait]
impl ReplySink for Recorder {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

fn handler_with(
    analyzer: DynEntityAnalyzer,
    generator: DynTextGenerator,
    sink: Arc<Recorder>,
) -> BotHandler {
    let catalog = Arc::new(EmojiCatalog::parse("📱,phone:mobile phone\n😍,love:heart eyes\n"));
    let translator = EmojiTranslator::new(analyzer, generator, catalog);
    let stub = Arc::new(StubAnalyzer::new(vec![]));
    BotHandler::new(translator, stub.clone(), stub, sink, 10)
}

fn test_router(secret: &str) -> (Router, Arc<Recorder>) {
    let sink = Arc::new(Recorder::default());
    let handler = handler_with(
        Arc::new(StubAnalyzer::new(vec![
            Entity::new("phone", "PRODUCT", 2),
            Entity::new("I", "PERSON", 1),
        ])),
        Arc::new(StubGenerator::new("Sure! [📱:😍]")),
        sink.clone(),
    );
    let state = AppState {
        handler,
        webhook_secret: secret.to_string(),
    };
    (api::router(state), sink)
}

async fn post_json(app: Router, uri: &str, body: Json, headers: &[(&str, &str)]) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (k, v) in headers {
        req = req.header(*k, *v);
    }
    let req = req.body(Body::from(body.to_string())).expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let (app, _) = test_router("");
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap().trim(), "OK");
}

#[tokio::test]
async fn api_translate_returns_entities_and_emojis() {
    let (app, _) = test_router("");
    let (status, bytes) = post_json(
        app,
        "/translate",
        json!({ "text": "I love my new phone, it's amazing!", "count": 3 }),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let v: Json = serde_json::from_slice(&bytes).expect("parse translate json");
    assert_eq!(v["entities"][0]["name"], "phone");
    assert_eq!(v["entities"][0]["type"], "PRODUCT");
    assert_eq!(v["entities"][0]["mentions"], 2);
    assert_eq!(v["entities"][1]["name"], "I");
    assert_eq!(v["emojis"], json!(["📱", "😍"]));
    assert_eq!(v["rendered"], "phone I\n📱 😍");
}

#[tokio::test]
async fn api_translate_rejects_empty_text() {
    let (app, _) = test_router("");
    let (status, bytes) = post_json(app, "/translate", json!({ "text": "  " }), &[]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert!(v["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn api_translate_maps_remote_failure_to_502() {
    let sink = Arc::new(Recorder::default());
    let handler = handler_with(
        Arc::new(FailingService {
            service: "language",
            status: 429,
        }),
        Arc::new(StubGenerator::new("[🙂]")),
        sink,
    );
    let app = api::router(AppState {
        handler,
        webhook_secret: String::new(),
    });

    let (status, bytes) = post_json(app, "/translate", json!({ "text": "hello" }), &[]).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let v: Json = serde_json::from_slice(&bytes).unwrap();
    assert!(v["error"].as_str().unwrap().starts_with("language:"));
}

fn update_json(text: &str) -> Json {
    json!({
        "update_id": 100,
        "message": {
            "message_id": 1,
            "date": 1_700_000_000,
            "chat": { "id": 77, "type": "private" },
            "text": text
        }
    })
}

#[tokio::test]
async fn webhook_with_wrong_secret_is_rejected() {
    let (app, sink) = test_router("s3cret");
    let (status, _) = post_json(
        app,
        "/telegram/webhook",
        update_json("hi"),
        &[(SECRET_HEADER, "nope")],
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sink.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn webhook_replies_through_the_sink() {
    let (app, sink) = test_router("s3cret");
    let (status, _) = post_json(
        app,
        "/telegram/webhook",
        update_json("I love my new phone"),
        &[(SECRET_HEADER, "s3cret")],
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The reply is sent from a spawned task.
    let mut sent = Vec::new();
    for _ in 0..50 {
        sent = sink.sent.lock().unwrap().clone();
        if !sent.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(sent, vec![(77, "phone I\n📱 😍".to_string())]);
}
