//! Engine client factory.
//!
//! Builds an [`EngineClient`] from application configuration. Credentials
//! are checked here, so a missing API key fails before any network call.

use crate::engine::EngineClient;
use crate::providers::{JigsawStackEngine, MockEngine};
use promptctl_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an engine client for the configured provider.
///
/// # Errors
/// Returns `AppError::Config` if:
/// - the configuration is invalid (unknown provider, zero timeout)
/// - the provider needs an API key and none is set
/// - the HTTP client cannot be initialized
pub fn create_engine(config: &AppConfig) -> AppResult<EngineClient> {
    config.validate()?;

    match config.engine.provider.to_lowercase().as_str() {
        "jigsawstack" => {
            let api_key = config.resolve_api_key()?;
            let engine = JigsawStackEngine::with_options(
                &config.engine.base_url,
                api_key,
                Duration::from_secs(config.engine.timeout),
            )?;
            tracing::debug!("Using JigsawStack engine at {}", config.engine.base_url);
            Ok(EngineClient::new(Arc::new(engine)))
        }
        "mock" => {
            tracing::warn!("Using in-process mock engine; results are not model output");
            Ok(EngineClient::new(Arc::new(MockEngine::new())))
        }
        other => Err(AppError::Config(format!("Unknown provider: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.engine.provider = provider.to_string();
        config.engine.api_key_env = "PROMPTCTL_FACTORY_TEST_KEY_NEVER_SET".to_string();
        config
    }

    #[test]
    fn test_create_mock_engine() {
        let client = create_engine(&config("mock")).unwrap();
        assert_eq!(client.provider_name(), "mock");
    }

    #[test]
    fn test_provider_name_is_case_insensitive() {
        let client = create_engine(&config("Mock")).unwrap();
        assert_eq!(client.provider_name(), "mock");
    }

    #[test]
    fn test_jigsawstack_requires_api_key() {
        match create_engine(&config("jigsawstack")) {
            Err(AppError::Config(msg)) => assert!(msg.contains("API key")),
            Err(other) => panic!("Expected configuration error, got {:?}", other),
            Ok(_) => panic!("Expected error for JigsawStack without API key"),
        }
    }

    #[test]
    fn test_create_jigsawstack_engine() {
        let mut config = config("jigsawstack");
        config.api_key = Some("sk-test".to_string());

        let client = create_engine(&config).unwrap();
        assert_eq!(client.provider_name(), "jigsawstack");
    }

    #[test]
    fn test_unknown_provider() {
        match create_engine(&config("openai")) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
