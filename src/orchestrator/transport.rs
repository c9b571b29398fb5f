use crate::config::{ApiKey, GeminiConfig};
use crate::error::AtomlinkError;
use crate::utils::logging::with_pretty_json_debug;
use async_trait::async_trait;
use atomlink_schema::{GenerateContentRequest, GenerateContentResponse};
use reqwest::header::{CONNECTION, HeaderMap, HeaderValue};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("atomlink/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";

/// One network call to the generation endpoint.
///
/// Implementations perform no retries or failover of their own.
#[async_trait]
pub trait GenerateTransport: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AtomlinkError>;
}

/// `generateContent` over HTTPS.
#[derive(Clone)]
pub struct GeminiApi {
    client: reqwest::Client,
    api_url: Url,
}

impl GeminiApi {
    pub fn new(cfg: &GeminiConfig) -> Result<Self, AtomlinkError> {
        Ok(Self {
            client: build_client(cfg)?,
            api_url: cfg.api_url.clone(),
        })
    }

    pub fn with_client(client: reqwest::Client, api_url: Url) -> Self {
        Self { client, api_url }
    }

    /// `{api_url}models/{model}:generateContent`
    pub fn endpoint(&self, model: &str) -> Result<Url, AtomlinkError> {
        Ok(self
            .api_url
            .join(&format!("models/{model}:generateContent"))?)
    }

    pub fn build_request(
        &self,
        model: &str,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Request, AtomlinkError> {
        Ok(self
            .client
            .post(self.endpoint(model)?)
            .header(API_KEY_HEADER, api_key.expose())
            .json(request)
            .build()?)
    }
}

#[async_trait]
impl GenerateTransport for GeminiApi {
    async fn generate_content(
        &self,
        model: &str,
        api_key: &ApiKey,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, AtomlinkError> {
        with_pretty_json_debug(request, |json| {
            debug!(model, "Outbound generateContent body:\n{json}");
        });

        let start = Instant::now();
        let resp = self
            .client
            .execute(self.build_request(model, api_key, request)?)
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        info!(
            model,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generateContent"
        );

        if !status.is_success() {
            return Err(AtomlinkError::upstream(status, &bytes));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn build_client(cfg: &GeminiConfig) -> Result<reqwest::Client, AtomlinkError> {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.request_timeout_secs));

    if let Some(proxy_url) = &cfg.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if cfg.enable_multiplexing {
        builder = builder.http2_adaptive_window(true);
    } else {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));
        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    }

    Ok(builder.default_headers(headers).build()?)
}
