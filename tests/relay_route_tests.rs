mod common;

use atomlink::server::{RelayState, relay_router};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use common::{FakeTransport, config_with_keys, orchestrator, response, text_response};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

async fn app(keys: (Option<&str>, Option<&str>), transport: Arc<FakeTransport>) -> Router {
    let cfg = config_with_keys(keys.0, keys.1);
    relay_router(RelayState::new(orchestrator(&cfg, transport).await))
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(body.into())
        .expect("failed to build request")
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_and_mode_catalog() {
    let app = app((Some("k1"), None), FakeTransport::new(|_| Ok(text_response("x")))).await;

    let resp = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = app
        .clone()
        .oneshot(Request::get("/api/modes").body(Body::empty()).unwrap())
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let modes = json_body(resp).await;
    assert_eq!(modes[0]["id"], "general");
    assert_eq!(modes[0]["label"], "General Helper");

    let resp = app
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_returns_text_and_composes_mode_instruction() {
    let transport = FakeTransport::new(|_| Ok(text_response("Hello")));
    let app = app((Some("k1"), None), transport.clone()).await;

    let resp = app
        .oneshot(post_json(
            "/api/generate",
            json!({"prompt": "Hi", "mode": "coding"}).to_string(),
        ))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!({"text": "Hello", "webSources": [], "mapSources": []})
    );

    let wire = serde_json::to_value(&transport.calls()[0].request).unwrap();
    let instruction = wire["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.contains("MODE: You are a senior software engineer."));
}

#[tokio::test]
async fn generate_rejects_bad_payloads() {
    let transport = FakeTransport::new(|_| Ok(text_response("x")));
    let app = app((Some("k1"), None), transport.clone()).await;

    let resp = app
        .clone()
        .oneshot(post_json("/api/generate", "not-json"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["error"]["code"], "INVALID_ARGUMENT");

    let resp = app
        .oneshot(post_json("/api/generate", r#"{"prompt": "   "}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn generate_without_keys_reports_setup_required() {
    let app = app((None, None), FakeTransport::new(|_| Ok(text_response("x")))).await;

    let resp = app
        .oneshot(post_json("/api/generate", r#"{"prompt": "Hi"}"#))
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(resp).await;
    assert_eq!(body["error"]["code"], "SETUP_REQUIRED");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Setup required")
    );
}

#[tokio::test]
async fn speech_streams_pcm_or_no_content() {
    let transport = FakeTransport::new(|call| {
        let wants_silence = call
            .request
            .contents
            .first()
            .and_then(|c| c.parts.first())
            .and_then(|p| p.text.as_deref())
            == Some("silence");
        if wants_silence {
            Ok(response(json!({"candidates": []})))
        } else {
            Ok(response(json!({
                "candidates": [{"content": {"parts": [
                    {"inlineData": {"mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AQACAA=="}}
                ]}}]
            })))
        }
    });
    let app = app((Some("k1"), None), transport).await;

    let resp = app
        .clone()
        .oneshot(post_json("/api/speech", r#"{"text": "Hello", "voice": "Puck"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(CONTENT_TYPE).unwrap(),
        "audio/L16; rate=24000; channels=1"
    );
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], &[0x01, 0x00, 0x02, 0x00]);

    let resp = app
        .oneshot(post_json("/api/speech", r#"{"text": "silence"}"#))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
