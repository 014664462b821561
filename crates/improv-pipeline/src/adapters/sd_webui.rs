//! Stable Diffusion WebUI Client
//!
//! Implements [`ImageGenerator`] against the AUTOMATIC1111 `/sdapi/v1`
//! REST API using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use improv::{ImageGenerator, ImageRequest, ImageResult, ModelInfo, Payload, PipelineError};

use super::http::{ensure_success, map_transport_error, trim_base_url};

const SERVICE: &str = "image service";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7860";

/// Connection settings for one WebUI instance
#[derive(Debug, Clone)]
pub struct SdWebUiConfig {
    pub base_url: String,
    /// Bound for txt2img/img2img; jobs routinely take minutes
    pub generation_timeout: Duration,
    /// Bound for options/model calls (model switches can be slow too)
    pub metadata_timeout: Duration,
    /// Bound for the reachability check
    pub health_timeout: Duration,
}

impl SdWebUiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(&base_url.into()),
            generation_timeout: Duration::from_secs(600),
            metadata_timeout: Duration::from_secs(120),
            health_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }
}

impl Default for SdWebUiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// HTTP client for a single WebUI instance
pub struct SdWebUiClient {
    client: Client,
    config: SdWebUiConfig,
}

impl SdWebUiClient {
    pub fn new(config: SdWebUiConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .user_agent(concat!("improv/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PipelineError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`reqwest::Client`]
    pub fn with_client(client: Client, config: SdWebUiConfig) -> Self {
        Self { client, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/sdapi/v1/{}", self.config.base_url, path)
    }

    async fn generate(
        &self,
        endpoint: &str,
        payload: &GenerationPayload<'_>,
    ) -> Result<ImageResult, PipelineError> {
        let timeout = self.config.generation_timeout;
        tracing::debug!(
            endpoint,
            sampler = payload.sampler_name,
            steps = payload.steps,
            batch_size = payload.batch_size,
            seed = payload.seed,
            "Submitting image generation"
        );

        let response = self
            .client
            .post(self.url(endpoint))
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            .map_err(|e| map_transport_error(SERVICE, endpoint, timeout, e))?;

        let response: GenerationResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| map_transport_error(SERVICE, endpoint, timeout, e))?;

        into_result(response)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, PipelineError> {
        let response = self
            .client
            .get(self.url(path))
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(SERVICE, path, timeout, e))?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| map_transport_error(SERVICE, path, timeout, e))
    }
}

#[async_trait]
impl ImageGenerator for SdWebUiClient {
    async fn txt2img(&self, request: &ImageRequest) -> Result<ImageResult, PipelineError> {
        let payload = GenerationPayload::from_request(request, None);
        self.generate("txt2img", &payload).await
    }

    async fn img2img(
        &self,
        request: &ImageRequest,
        init_image: &[u8],
    ) -> Result<ImageResult, PipelineError> {
        let encoded = STANDARD.encode(init_image);
        let payload = GenerationPayload::from_request(request, Some(encoded));
        self.generate("img2img", &payload).await
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, PipelineError> {
        let models: Vec<SdModel> = self
            .get_json("sd-models", self.config.metadata_timeout)
            .await?;
        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                title: m.title,
                model_name: m.model_name,
            })
            .collect())
    }

    async fn current_model(&self) -> Result<String, PipelineError> {
        let options: Value = self
            .get_json("options", self.config.metadata_timeout)
            .await?;
        Ok(options
            .get("sd_model_checkpoint")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string())
    }

    async fn set_model(&self, model: &str) -> Result<(), PipelineError> {
        let timeout = self.config.metadata_timeout;
        let body = serde_json::json!({ "sd_model_checkpoint": model });

        let response = self
            .client
            .post(self.url("options"))
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(SERVICE, "options", timeout, e))?;

        ensure_success(response).await?;
        tracing::info!(model, "Switched image model");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, PipelineError> {
        let result = self
            .client
            .get(self.url("sd-models"))
            .timeout(self.config.health_timeout)
            .send()
            .await;

        match result {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => {
                tracing::debug!(error = %e, "Image service health check failed");
                Ok(false)
            }
        }
    }
}

// ============================================
// Request/Response Types
// ============================================

#[derive(Debug, Serialize)]
struct GenerationPayload<'a> {
    prompt: &'a str,
    negative_prompt: &'a str,
    sampler_name: &'a str,
    steps: u32,
    cfg_scale: f32,
    width: u32,
    height: u32,
    batch_size: u32,
    seed: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    init_images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    denoising_strength: Option<f32>,
}

impl<'a> GenerationPayload<'a> {
    fn from_request(request: &'a ImageRequest, init_image: Option<String>) -> Self {
        let settings = &request.settings;
        let is_variation = init_image.is_some();
        Self {
            prompt: &request.prompt,
            negative_prompt: &request.negative_prompt,
            sampler_name: &settings.sampler_name,
            steps: settings.steps,
            cfg_scale: settings.cfg_scale,
            width: settings.width,
            height: settings.height,
            batch_size: settings.batch_size,
            seed: request.seed.0,
            init_images: init_image.map(|img| vec![img]),
            denoising_strength: if is_variation {
                settings.denoising_strength
            } else {
                None
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    info: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SdModel {
    title: String,
    #[serde(default)]
    model_name: String,
}

// ============================================
// Helper Functions
// ============================================

fn into_result(response: GenerationResponse) -> Result<ImageResult, PipelineError> {
    if response.images.is_empty() {
        return Err(PipelineError::invalid_response(SERVICE, "no images returned"));
    }

    let info = parse_info(response.info);
    let seed = info.get("seed").and_then(Value::as_i64);

    Ok(ImageResult {
        images: response.images.into_iter().map(Payload::Base64).collect(),
        seed,
        info,
    })
}

/// `info` arrives as a JSON document encoded in a string
fn parse_info(info: Option<Value>) -> Value {
    match info {
        Some(Value::String(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unparseable generation info");
            Value::Object(Default::default())
        }),
        Some(other) => other,
        None => Value::Object(Default::default()),
    }
}
