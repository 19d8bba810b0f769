//! Template model for promptctl.
//!
//! This crate provides:
//! - The immutable `TemplateDescriptor` and its parts
//! - Placeholder scanning
//! - Input binding resolution
//! - YAML template files in the workspace

pub mod loader;
pub mod placeholder;
pub mod resolver;
pub mod types;

// Re-export main types
pub use loader::{list_templates, load_template, load_template_file, TemplateDefinition};
pub use placeholder::{is_placeholder_name, placeholders, PLACEHOLDER_RE};
pub use resolver::{resolve, ResolvedInputs};
pub use types::{
    InputSpec, InputValues, PolicyTag, ReturnShape, StepSpec, TemplateBuilder, TemplateDescriptor,
};
