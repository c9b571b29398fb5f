#![allow(dead_code)]

use async_trait::async_trait;
use atomlink::AtomlinkError;
use atomlink::config::{ApiKey, Config};
use atomlink::orchestrator::{
    CredentialPool, CredentialPoolHandle, GenerateTransport, Orchestrator,
};
use atomlink_schema::{GenerateContentRequest, GenerateContentResponse};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

/// One call seen by the fake transport.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub key: String,
    pub request: GenerateContentRequest,
}

type Responder =
    dyn Fn(&RecordedCall) -> Result<GenerateContentResponse, AtomlinkError> + Send + Sync;

/// Transport whose answers are computed from the call it receives.
pub struct FakeTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Box<Responder>,
}

impl FakeTransport {
    pub fn new<F>(responder: F) -> Arc<Self>
    where
        F: Fn(&RecordedCall) -> Result<GenerateContentResponse, AtomlinkError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.key).collect()
    }
}

#[async_trait]
impl GenerateTransport for FakeTransport {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AtomlinkError> {
        let call = RecordedCall {
            model: model.to_string(),
            key: api_key.expose().to_string(),
            request: request.clone(),
        };
        self.calls.lock().unwrap().push(call.clone());
        (self.responder)(&call)
    }
}

pub fn config_with_keys(primary: Option<&str>, secondary: Option<&str>) -> Config {
    let mut cfg = Config::default();
    cfg.credentials.primary = primary.map(ApiKey::new);
    cfg.credentials.secondary = secondary.map(ApiKey::new);
    cfg
}

pub async fn orchestrator(cfg: &Config, transport: Arc<FakeTransport>) -> Orchestrator {
    let pool = CredentialPoolHandle::spawn(CredentialPool::from_config(&cfg.credentials))
        .await
        .expect("spawn credential pool");
    Orchestrator::new(transport, pool, cfg)
}

pub fn text_response(text: &str) -> GenerateContentResponse {
    response(json!({
        "candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]
    }))
}

pub fn response(value: Value) -> GenerateContentResponse {
    serde_json::from_value(value).expect("valid response fixture")
}

pub fn upstream_error(status: u16, message: &str) -> AtomlinkError {
    let status = StatusCode::from_u16(status).expect("valid status");
    let body = json!({"error": {"code": status.as_u16(), "message": message}});
    AtomlinkError::upstream(status, body.to_string().as_bytes())
}
