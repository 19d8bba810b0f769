//! Prompt engine client for promptctl.
//!
//! Talks to a hosted prompt engine in two modes:
//! - **Direct**: send template, inputs and values in one call
//! - **Managed**: register a template once, then run it by handle
//!
//! # Providers
//! - **JigsawStack**: the hosted prompt engine (default)
//! - **Mock**: in-process stand-in for tests and offline runs
//!
//! # Example
//! ```no_run
//! use promptctl_engine::{providers::JigsawStackEngine, EngineClient};
//! use promptctl_prompt::{InputSpec, InputValues, TemplateDescriptor};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = JigsawStackEngine::new(std::env::var("JIGSAWSTACK_API_KEY")?)?;
//! let client = EngineClient::new(Arc::new(engine));
//!
//! let descriptor = TemplateDescriptor::builder("How to cook {dish}")
//!     .input(InputSpec::new("dish"))
//!     .build()?;
//! let handle = client.create(&descriptor).await?;
//!
//! let mut values = InputValues::new();
//! values.insert("dish".to_string(), "Singaporean chicken rice".to_string());
//! let result = client.run(&handle, &values).await?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod composer;
pub mod engine;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{
    CreateRequest, DirectRequest, EngineHandle, PromptEngine, RenderedResult, RunRequest,
};
pub use composer::{compose_create, compose_direct, compose_run};
pub use engine::EngineClient;
pub use factory::create_engine;
pub use providers::{JigsawStackEngine, MockEngine};
