//! Prompt engine abstraction and request/response types.
//!
//! The hosted engine offers three operations: run a template directly,
//! register a template, and run a registered template by handle. Providers
//! implement [`PromptEngine`] for a concrete backend.

use promptctl_core::{AppError, AppResult};
use promptctl_prompt::{InputSpec, PolicyTag, ResolvedInputs, ReturnShape};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a template registered with the engine.
///
/// Never empty. The engine owns its lifecycle; the client never expires or
/// deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EngineHandle(String);

impl EngineHandle {
    /// Wrap an identifier returned by the engine.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `id` is blank.
    pub fn new(id: impl Into<String>) -> AppResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(AppError::Validation(
                "Engine handle cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EngineHandle {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl TryFrom<String> for EngineHandle {
    type Error = AppError;

    fn try_from(value: String) -> AppResult<Self> {
        Self::new(value)
    }
}

impl From<EngineHandle> for String {
    fn from(handle: EngineHandle) -> Self {
        handle.0
    }
}

/// Run a template in one call (direct mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectRequest {
    /// Template text with `{key}` placeholders, unsubstituted
    pub prompt: String,

    /// Every declared input
    pub inputs: Vec<InputSpec>,

    /// Requested answer shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_shape: Option<ReturnShape>,

    /// Guard categories to enforce
    pub safety_policy: Vec<PolicyTag>,

    /// Values for the placeholders
    pub input_values: ResolvedInputs,
}

/// Register a template (managed mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRequest {
    pub prompt: String,

    pub inputs: Vec<InputSpec>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_shape: Option<ReturnShape>,

    pub safety_policy: Vec<PolicyTag>,
}

/// Run a registered template (managed mode).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest {
    pub handle: EngineHandle,

    pub input_values: ResolvedInputs,
}

/// The engine's answer, as returned.
///
/// Text-shaped templates yield a JSON string (usually markdown); step-shaped
/// templates yield structured JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedResult {
    pub result: serde_json::Value,
}

impl RenderedResult {
    pub fn new(result: serde_json::Value) -> Self {
        Self { result }
    }

    /// The result text, when the engine answered with a string.
    pub fn as_text(&self) -> Option<&str> {
        self.result.as_str()
    }

    /// True for null, blank strings and empty collections.
    pub fn is_empty(&self) -> bool {
        match &self.result {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.trim().is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for RenderedResult {
    /// Strings verbatim, anything else as pretty JSON.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            serde_json::Value::String(text) => f.write_str(text),
            other => {
                let pretty = serde_json::to_string_pretty(other).map_err(|_| fmt::Error)?;
                f.write_str(&pretty)
            }
        }
    }
}

/// Trait for prompt engine providers.
///
/// Implementations forward requests as-is: no retries, no caching, no local
/// placeholder substitution. Transport and service failures are reported as
/// `AppError::EngineRequest`.
#[async_trait::async_trait]
pub trait PromptEngine: Send + Sync {
    /// Get the provider name (e.g., "jigsawstack", "mock").
    fn provider_name(&self) -> &str;

    /// Render a template in a single call.
    async fn run_prompt_direct(&self, request: &DirectRequest) -> AppResult<RenderedResult>;

    /// Register a template and return its handle.
    async fn create(&self, request: &CreateRequest) -> AppResult<EngineHandle>;

    /// Render a registered template.
    async fn run(&self, request: &RunRequest) -> AppResult<RenderedResult>;
}
