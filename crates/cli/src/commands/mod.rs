//! Command handlers for promptctl.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod args;
pub mod create;
pub mod direct;
pub mod run;
pub mod templates;

// Re-export command types for convenience
pub use create::CreateCommand;
pub use direct::DirectCommand;
pub use run::{BatchCommand, RunCommand};
pub use templates::TemplatesCommand;
