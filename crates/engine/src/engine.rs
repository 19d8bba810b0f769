//! Engine client facade.
//!
//! Ties resolution, composition and dispatch together for both workflows:
//! - direct: `run_direct(descriptor, values)`
//! - managed: `create(descriptor)` once, then `run(handle, values)` any
//!   number of times

use crate::client::{EngineHandle, PromptEngine, RenderedResult};
use crate::composer::{compose_create, compose_direct, compose_run};
use promptctl_core::AppResult;
use promptctl_prompt::{resolve, InputValues, ResolvedInputs, TemplateDescriptor};
use std::sync::Arc;

/// Thin, deterministic forwarder to a [`PromptEngine`].
///
/// Holds no mutable state; clones share the provider and may dispatch
/// concurrently.
#[derive(Clone)]
pub struct EngineClient {
    engine: Arc<dyn PromptEngine>,
}

impl EngineClient {
    pub fn new(engine: Arc<dyn PromptEngine>) -> Self {
        Self { engine }
    }

    pub fn provider_name(&self) -> &str {
        self.engine.provider_name()
    }

    /// Resolve `values` and run the template in one dispatch.
    ///
    /// # Errors
    /// `MissingInput`/`UnknownInput` before any dispatch, `EngineRequest`
    /// when the engine call fails.
    pub async fn run_direct(
        &self,
        descriptor: &TemplateDescriptor,
        values: &InputValues,
    ) -> AppResult<RenderedResult> {
        let resolved = resolve(descriptor, values)?;
        let request = compose_direct(descriptor, resolved);

        tracing::info!(
            "Dispatching direct run via {} ({} inputs)",
            self.provider_name(),
            request.input_values.len()
        );
        tracing::debug!("Direct request: {:?}", request);

        self.engine.run_prompt_direct(&request).await
    }

    /// Register the template and return its handle.
    ///
    /// Every call registers anew; identical descriptors get distinct handles.
    pub async fn create(&self, descriptor: &TemplateDescriptor) -> AppResult<EngineHandle> {
        let request = compose_create(descriptor);

        tracing::info!("Registering template via {}", self.provider_name());
        tracing::debug!("Create request: {:?}", request);

        self.engine.create(&request).await
    }

    /// Run a registered template.
    ///
    /// Values go out unchecked: the engine holds the registered inputs and
    /// rejects mismatches itself, surfacing as `EngineRequest`.
    pub async fn run(
        &self,
        handle: &EngineHandle,
        values: &InputValues,
    ) -> AppResult<RenderedResult> {
        let request = compose_run(handle, ResolvedInputs::unchecked(values.clone()));

        tracing::info!("Dispatching run of {} via {}", handle, self.provider_name());
        tracing::debug!("Run request: {:?}", request);

        self.engine.run(&request).await
    }

    /// Run a registered template, resolving `values` against a descriptor
    /// the caller still holds.
    pub async fn run_checked(
        &self,
        handle: &EngineHandle,
        descriptor: &TemplateDescriptor,
        values: &InputValues,
    ) -> AppResult<RenderedResult> {
        let resolved = resolve(descriptor, values)?;
        let request = compose_run(handle, resolved);

        tracing::info!(
            "Dispatching checked run of {} via {}",
            handle,
            self.provider_name()
        );
        tracing::debug!("Run request: {:?}", request);

        self.engine.run(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DirectRequest;
    use crate::providers::{MockEngine, RecordedCall};
    use promptctl_core::AppError;
    use promptctl_prompt::{InputSpec, PolicyTag};

    fn values(pairs: &[(&str, &str)]) -> InputValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn client() -> (EngineClient, Arc<MockEngine>) {
        let mock = Arc::new(MockEngine::new());
        (EngineClient::new(mock.clone()), mock)
    }

    fn story() -> TemplateDescriptor {
        TemplateDescriptor::builder("Tell me a story about {about}")
            .input(InputSpec::new("about"))
            .return_text("Return the result in a markdown format")
            .guard(PolicyTag::SexualContent)
            .guard(PolicyTag::Defamation)
            .build()
            .unwrap()
    }

    fn dish() -> TemplateDescriptor {
        TemplateDescriptor::builder("How to cook {dish}")
            .input(InputSpec::new("dish"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_direct_story() {
        let (client, mock) = client();

        let result = client
            .run_direct(&story(), &values(&[("about", "Tower of babel")]))
            .await
            .unwrap();
        assert!(!result.is_empty());
        assert_eq!(result.as_text(), Some("Tell me a story about Tower of babel"));

        let calls = mock.calls().await;
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            RecordedCall::Direct(DirectRequest {
                prompt,
                inputs,
                input_values,
                safety_policy,
                ..
            }) => {
                assert_eq!(prompt, "Tell me a story about {about}");
                assert_eq!(inputs, &vec![InputSpec::new("about")]);
                assert_eq!(input_values.get("about"), Some("Tower of babel"));
                assert_eq!(safety_policy.len(), 2);
            }
            other => panic!("Expected direct dispatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_direct_missing_input_never_dispatches() {
        let (client, mock) = client();

        match client.run_direct(&story(), &InputValues::new()).await {
            Err(AppError::MissingInput(key)) => assert_eq!(key, "about"),
            other => panic!("Expected missing input, got {:?}", other),
        }
        assert!(mock.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_direct_unknown_input_never_dispatches() {
        let (client, mock) = client();

        let result = client
            .run_direct(
                &story(),
                &values(&[("about", "Tower of babel"), ("style", "noir")]),
            )
            .await;
        assert!(matches!(result, Err(AppError::UnknownInput(ref key)) if key == "style"));
        assert!(mock.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_then_run_repeatedly() {
        let (client, mock) = client();

        let handle = client.create(&dish()).await.unwrap();
        let first = client
            .run(&handle, &values(&[("dish", "Singaporean chicken rice")]))
            .await
            .unwrap();
        let second = client
            .run(&handle, &values(&[("dish", "Pasta")]))
            .await
            .unwrap();

        assert_eq!(
            first.as_text(),
            Some("How to cook Singaporean chicken rice")
        );
        assert_eq!(second.as_text(), Some("How to cook Pasta"));
        assert_eq!(mock.registered().await, 1);
        assert_eq!(mock.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_create_twice_gives_two_handles() {
        let (client, mock) = client();

        let first = client.create(&dish()).await.unwrap();
        let second = client.create(&dish()).await.unwrap();

        assert_ne!(first, second);
        let creates = mock
            .calls()
            .await
            .into_iter()
            .filter(|call| matches!(call, RecordedCall::Create(_)))
            .count();
        assert_eq!(creates, 2);
    }

    #[tokio::test]
    async fn test_run_forwards_values_unchecked() {
        let (client, mock) = client();
        let handle = client.create(&dish()).await.unwrap();

        let result = client.run(&handle, &values(&[("drink", "Tea")])).await;
        assert!(matches!(result, Err(AppError::EngineRequest(_))));

        match mock.calls().await.last() {
            Some(RecordedCall::Run(request)) => {
                assert_eq!(request.input_values.get("drink"), Some("Tea"))
            }
            other => panic!("Expected run dispatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_checked_resolves_locally() {
        let (client, mock) = client();
        let handle = client.create(&dish()).await.unwrap();

        let result = client
            .run_checked(&handle, &dish(), &values(&[("drink", "Tea")]))
            .await;
        assert!(matches!(result, Err(AppError::MissingInput(ref key)) if key == "dish"));
        assert_eq!(mock.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_engine_failure_propagates() {
        let client = EngineClient::new(Arc::new(MockEngine::failing("upstream timeout")));

        match client
            .run_direct(&story(), &values(&[("about", "Tower of babel")]))
            .await
        {
            Err(AppError::EngineRequest(msg)) => assert_eq!(msg, "upstream timeout"),
            other => panic!("Expected engine error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_concurrent_runs_share_one_handle() {
        let (client, _mock) = client();
        let handle = client.create(&dish()).await.unwrap();

        let dishes = ["Laksa", "Pasta", "Ramen"];
        let runs = dishes.iter().map(|dish| {
            let client = client.clone();
            let handle = handle.clone();
            let values = values(&[("dish", *dish)]);
            async move { client.run(&handle, &values).await }
        });

        let results = futures::future::join_all(runs).await;
        for (dish, result) in dishes.iter().zip(results) {
            assert_eq!(
                result.unwrap().as_text().map(str::to_string),
                Some(format!("How to cook {}", dish))
            );
        }
    }
}
