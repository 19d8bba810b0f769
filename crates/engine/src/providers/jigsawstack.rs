//! JigsawStack prompt engine provider.
//!
//! REST API (v1), authenticated with the `x-api-key` header:
//! - `POST /prompt_engine/run`  run a template directly
//! - `POST /prompt_engine`      register a template
//! - `POST /prompt_engine/{id}` run a registered template

use crate::client::{
    CreateRequest, DirectRequest, EngineHandle, PromptEngine, RenderedResult, RunRequest,
};
use promptctl_core::{AppError, AppResult};
use promptctl_prompt::{InputSpec, ReturnShape};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.jigsawstack.com/v1";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct WireInput {
    key: String,
    optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    initial_value: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireStep {
    step: String,
    instructions: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireReturnPrompt {
    Text(String),
    Steps(Vec<WireStep>),
}

/// Body of `POST /prompt_engine/run`.
#[derive(Debug, Serialize)]
struct WireDirectRequest {
    prompt: String,
    inputs: Vec<WireInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_prompt: Option<WireReturnPrompt>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    prompt_guard: Vec<String>,
    input_values: BTreeMap<String, String>,
}

/// Body of `POST /prompt_engine`.
#[derive(Debug, Serialize)]
struct WireCreateRequest {
    prompt: String,
    inputs: Vec<WireInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_prompt: Option<WireReturnPrompt>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    prompt_guard: Vec<String>,
}

/// Body of `POST /prompt_engine/{id}`.
#[derive(Debug, Serialize)]
struct WireRunRequest {
    input_values: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct WireResultResponse {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCreateResponse {
    #[serde(default = "default_true")]
    success: bool,
    #[serde(default)]
    prompt_engine_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn default_true() -> bool {
    true
}

/// JigsawStack prompt engine client.
pub struct JigsawStackEngine {
    /// Base URL for the REST API
    base_url: Url,

    /// Value of the `x-api-key` header
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl JigsawStackEngine {
    /// Create a client against the public endpoint with the default timeout.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_options(DEFAULT_BASE_URL, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL and request timeout.
    ///
    /// # Errors
    /// Returns `AppError::Config` for a blank API key, an unparseable base
    /// URL, or an HTTP client that cannot be built.
    pub fn with_options(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::Config("API key cannot be empty".to_string()));
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Base URL cannot carry a path: {}",
                base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    /// Append path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Config(format!("Base URL cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn to_wire_inputs(inputs: &[InputSpec]) -> Vec<WireInput> {
        inputs
            .iter()
            .map(|spec| WireInput {
                key: spec.key.clone(),
                optional: spec.optional,
                initial_value: spec.default_value.clone(),
            })
            .collect()
    }

    fn to_wire_return(shape: Option<&ReturnShape>) -> Option<WireReturnPrompt> {
        shape.map(|shape| match shape {
            ReturnShape::Text(text) => WireReturnPrompt::Text(text.clone()),
            ReturnShape::Steps(steps) => WireReturnPrompt::Steps(
                steps
                    .iter()
                    .map(|s| WireStep {
                        step: s.step_label.clone(),
                        instructions: s.instruction_text.clone(),
                    })
                    .collect(),
            ),
        })
    }

    fn to_wire_direct(request: &DirectRequest) -> WireDirectRequest {
        WireDirectRequest {
            prompt: request.prompt.clone(),
            inputs: Self::to_wire_inputs(&request.inputs),
            return_prompt: Self::to_wire_return(request.return_shape.as_ref()),
            prompt_guard: request
                .safety_policy
                .iter()
                .map(|tag| tag.as_str().to_string())
                .collect(),
            input_values: request.input_values.as_map().clone(),
        }
    }

    fn to_wire_create(request: &CreateRequest) -> WireCreateRequest {
        WireCreateRequest {
            prompt: request.prompt.clone(),
            inputs: Self::to_wire_inputs(&request.inputs),
            return_prompt: Self::to_wire_return(request.return_shape.as_ref()),
            prompt_guard: request
                .safety_policy
                .iter()
                .map(|tag| tag.as_str().to_string())
                .collect(),
        }
    }

    /// POST a JSON body and decode a JSON response.
    async fn post<B, R>(&self, url: Url, body: &B) -> AppResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::EngineRequest(format!("Failed to reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::EngineRequest(format!(
                "JigsawStack API error ({}): {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::EngineRequest(format!("Failed to parse response: {}", e)))
    }

    fn into_result(response: WireResultResponse) -> AppResult<RenderedResult> {
        if !response.success {
            return Err(AppError::EngineRequest(
                response
                    .message
                    .unwrap_or_else(|| "Engine reported failure".to_string()),
            ));
        }
        Ok(RenderedResult::new(response.result))
    }

    fn into_handle(response: WireCreateResponse) -> AppResult<EngineHandle> {
        if !response.success {
            return Err(AppError::EngineRequest(
                response
                    .message
                    .unwrap_or_else(|| "Engine reported failure".to_string()),
            ));
        }
        let id = response.prompt_engine_id.unwrap_or_default();
        EngineHandle::new(id).map_err(|_| {
            AppError::EngineRequest("Response did not include a prompt_engine_id".to_string())
        })
    }
}

#[async_trait::async_trait]
impl PromptEngine for JigsawStackEngine {
    fn provider_name(&self) -> &str {
        "jigsawstack"
    }

    async fn run_prompt_direct(&self, request: &DirectRequest) -> AppResult<RenderedResult> {
        tracing::info!("Sending direct prompt run to JigsawStack");

        let body = Self::to_wire_direct(request);
        let url = self.endpoint(&["prompt_engine", "run"])?;
        let response: WireResultResponse = self.post(url, &body).await?;

        tracing::info!("Received direct prompt result from JigsawStack");
        Self::into_result(response)
    }

    async fn create(&self, request: &CreateRequest) -> AppResult<EngineHandle> {
        tracing::info!("Registering prompt engine with JigsawStack");

        let body = Self::to_wire_create(request);
        let url = self.endpoint(&["prompt_engine"])?;
        let response: WireCreateResponse = self.post(url, &body).await?;

        let handle = Self::into_handle(response)?;
        tracing::info!("Registered prompt engine {}", handle);
        Ok(handle)
    }

    async fn run(&self, request: &RunRequest) -> AppResult<RenderedResult> {
        tracing::info!("Running prompt engine {} on JigsawStack", request.handle);

        let body = WireRunRequest {
            input_values: request.input_values.as_map().clone(),
        };
        let url = self.endpoint(&["prompt_engine", request.handle.as_str()])?;
        let response: WireResultResponse = self.post(url, &body).await?;

        Self::into_result(response)
    }
}
