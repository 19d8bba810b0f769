//! In-process prompt engine for tests and offline runs.

use crate::client::{
    CreateRequest, DirectRequest, EngineHandle, PromptEngine, RenderedResult, RunRequest,
};
use promptctl_core::{AppError, AppResult};
use promptctl_prompt::{InputSpec, ResolvedInputs, ReturnShape, PLACEHOLDER_RE};
use regex::Captures;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// A dispatch seen by the mock engine.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Direct(DirectRequest),
    Create(CreateRequest),
    Run(RunRequest),
}

/// Mock engine that behaves like the hosted service, minus the model.
///
/// Registered templates are kept in memory. Rendering substitutes the
/// resolved values into the prompt text, and step-shaped templates answer
/// with one JSON object per step. Every dispatch is recorded so tests can
/// assert on exactly what was sent.
#[derive(Debug, Default)]
pub struct MockEngine {
    templates: Mutex<HashMap<String, CreateRequest>>,
    calls: Mutex<Vec<RecordedCall>>,
    next_id: AtomicU64,
    failure: Option<String>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every call fails with `message`, after being recorded.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Every dispatch so far, in order.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Number of templates registered so far.
    pub async fn registered(&self) -> usize {
        self.templates.lock().await.len()
    }

    async fn record(&self, call: RecordedCall) -> AppResult<()> {
        self.calls.lock().await.push(call);
        match self.failure {
            Some(ref message) => Err(AppError::EngineRequest(message.clone())),
            None => Ok(()),
        }
    }

    fn substitute(prompt: &str, values: &ResolvedInputs) -> String {
        PLACEHOLDER_RE
            .replace_all(prompt, |caps: &Captures| {
                values
                    .get(&caps[1])
                    .map(str::to_string)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn render(
        prompt: &str,
        return_shape: Option<&ReturnShape>,
        values: &ResolvedInputs,
    ) -> AppResult<RenderedResult> {
        let text = Self::substitute(prompt, values);

        let result = match return_shape {
            Some(ReturnShape::Steps(steps)) => serde_json::Value::Array(
                steps
                    .iter()
                    .map(|step| {
                        serde_json::json!({
                            step.step_label.clone(): format!("{}: {}", step.instruction_text, text)
                        })
                    })
                    .collect(),
            ),
            _ => serde_json::Value::String(text),
        };

        Ok(RenderedResult::new(result))
    }

    /// Service-side check of run values against the registered inputs.
    fn check_inputs(inputs: &[InputSpec], values: &ResolvedInputs) -> AppResult<()> {
        if let Some(missing) = inputs
            .iter()
            .find(|spec| spec.is_required() && values.get(&spec.key).is_none())
        {
            return Err(AppError::EngineRequest(format!(
                "Missing input value: {}",
                missing.key
            )));
        }

        if let Some(unknown) = values
            .as_map()
            .keys()
            .find(|key| !inputs.iter().any(|spec| &spec.key == *key))
        {
            return Err(AppError::EngineRequest(format!(
                "Unexpected input value: {}",
                unknown
            )));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl PromptEngine for MockEngine {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn run_prompt_direct(&self, request: &DirectRequest) -> AppResult<RenderedResult> {
        self.record(RecordedCall::Direct(request.clone())).await?;
        Self::render(
            &request.prompt,
            request.return_shape.as_ref(),
            &request.input_values,
        )
    }

    async fn create(&self, request: &CreateRequest) -> AppResult<EngineHandle> {
        self.record(RecordedCall::Create(request.clone())).await?;

        let id = format!("mock-engine-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.templates
            .lock()
            .await
            .insert(id.clone(), request.clone());

        EngineHandle::new(id)
    }

    async fn run(&self, request: &RunRequest) -> AppResult<RenderedResult> {
        self.record(RecordedCall::Run(request.clone())).await?;

        let template = self
            .templates
            .lock()
            .await
            .get(request.handle.as_str())
            .cloned()
            .ok_or_else(|| {
                AppError::EngineRequest(format!("Prompt engine not found: {}", request.handle))
            })?;

        Self::check_inputs(&template.inputs, &request.input_values)?;

        // Declared defaults apply on the service side for managed runs.
        let mut values = request.input_values.as_map().clone();
        for spec in &template.inputs {
            if let Some(ref default) = spec.default_value {
                values
                    .entry(spec.key.clone())
                    .or_insert_with(|| default.clone());
            }
        }

        Self::render(
            &template.prompt,
            template.return_shape.as_ref(),
            &ResolvedInputs::unchecked(values),
        )
    }
}
