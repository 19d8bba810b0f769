//! Prompt engine provider implementations.

pub mod jigsawstack;
pub mod mock;

pub use jigsawstack::JigsawStackEngine;
pub use mock::{MockEngine, RecordedCall};
