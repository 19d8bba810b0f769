//! Template types for promptctl.
//!
//! This module defines the immutable template descriptor and the pieces it
//! is made of. Field names on the wire follow the hosted engine's camelCase
//! template files (`prompt`, `inputs`, `returnPrompt`, `promptGuard`).

use promptctl_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::placeholder::{is_placeholder_name, placeholders};

/// Concrete input values keyed by input name.
pub type InputValues = BTreeMap<String, String>;

/// Declaration of one template input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Input name, referenced as `{key}` in the prompt text
    pub key: String,

    /// Whether the input may be left unset
    #[serde(default)]
    pub optional: bool,

    /// Value used when the caller supplies none
    #[serde(
        rename = "initialValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_value: Option<String>,
}

impl InputSpec {
    /// A required input with no default.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            optional: false,
            default_value: None,
        }
    }

    /// Mark the input optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// True when resolution fails without an explicit value.
    pub fn is_required(&self) -> bool {
        !self.optional && self.default_value.is_none()
    }
}

/// One step of a structured multi-step response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    #[serde(rename = "step")]
    pub step_label: String,

    #[serde(rename = "instructions")]
    pub instruction_text: String,
}

impl StepSpec {
    pub fn new(step_label: impl Into<String>, instruction_text: impl Into<String>) -> Self {
        Self {
            step_label: step_label.into(),
            instruction_text: instruction_text.into(),
        }
    }
}

/// Shape the engine should give its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReturnShape {
    /// Free-form instruction, e.g. "Return the result in a markdown format"
    Text(String),

    /// Structured response, one entry per step
    Steps(Vec<StepSpec>),
}

/// Content-safety categories enforced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyTag {
    Defamation,
    SpecializedAdvice,
    Privacy,
    IntellectualProperty,
    ChildExploitation,
    IndiscriminateWeapons,
    Hate,
    SexualContent,
    Elections,
    CodeInterpreterAbuse,
    ViolentCrimes,
    NonViolentCrimes,
    SexRelatedCrimes,
    SuicideSelfHarm,
}

impl PolicyTag {
    pub const ALL: [PolicyTag; 14] = [
        PolicyTag::Defamation,
        PolicyTag::SpecializedAdvice,
        PolicyTag::Privacy,
        PolicyTag::IntellectualProperty,
        PolicyTag::ChildExploitation,
        PolicyTag::IndiscriminateWeapons,
        PolicyTag::Hate,
        PolicyTag::SexualContent,
        PolicyTag::Elections,
        PolicyTag::CodeInterpreterAbuse,
        PolicyTag::ViolentCrimes,
        PolicyTag::NonViolentCrimes,
        PolicyTag::SexRelatedCrimes,
        PolicyTag::SuicideSelfHarm,
    ];

    /// Get the engine's name for this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defamation => "defamation",
            Self::SpecializedAdvice => "specialized_advice",
            Self::Privacy => "privacy",
            Self::IntellectualProperty => "intellectual_property",
            Self::ChildExploitation => "child_exploitation",
            Self::IndiscriminateWeapons => "indiscriminate_weapons",
            Self::Hate => "hate",
            Self::SexualContent => "sexual_content",
            Self::Elections => "elections",
            Self::CodeInterpreterAbuse => "code_interpreter_abuse",
            Self::ViolentCrimes => "violent_crimes",
            Self::NonViolentCrimes => "non_violent_crimes",
            Self::SexRelatedCrimes => "sex_related_crimes",
            Self::SuicideSelfHarm => "suicide_self_harm",
        }
    }
}

impl fmt::Display for PolicyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyTag {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str() == wanted)
            .ok_or_else(|| AppError::Validation(format!("Unknown policy tag: {}", s)))
    }
}

/// Immutable definition of a prompt template.
///
/// Built with [`TemplateDescriptor::builder`] or deserialized from a template
/// file; both paths run the same validation, so holding a descriptor means
/// its invariants hold:
/// - the prompt text is not blank
/// - input keys are non-empty and unique
/// - every `{placeholder}` names a declared input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct TemplateDescriptor {
    #[serde(rename = "prompt")]
    prompt_text: String,

    inputs: Vec<InputSpec>,

    #[serde(rename = "returnPrompt", skip_serializing_if = "Option::is_none")]
    return_shape: Option<ReturnShape>,

    #[serde(rename = "promptGuard", skip_serializing_if = "BTreeSet::is_empty")]
    safety_policy: BTreeSet<PolicyTag>,
}

/// Unvalidated descriptor as it appears in template files.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    prompt: String,
    #[serde(default)]
    inputs: Vec<InputSpec>,
    #[serde(rename = "returnPrompt", default)]
    return_prompt: Option<ReturnShape>,
    #[serde(rename = "promptGuard", default)]
    prompt_guard: BTreeSet<PolicyTag>,
}

impl TryFrom<RawDescriptor> for TemplateDescriptor {
    type Error = AppError;

    fn try_from(raw: RawDescriptor) -> AppResult<Self> {
        TemplateDescriptor::builder(raw.prompt)
            .inputs(raw.inputs)
            .maybe_return_shape(raw.return_prompt)
            .guards(raw.prompt_guard)
            .build()
    }
}

impl TemplateDescriptor {
    /// Start building a descriptor for `prompt_text`.
    ///
    /// # Example
    /// ```
    /// use promptctl_prompt::{InputSpec, PolicyTag, TemplateDescriptor};
    ///
    /// let descriptor = TemplateDescriptor::builder("Tell me a story about {about}")
    ///     .input(InputSpec::new("about").with_default("Leaning Tower of Pisa"))
    ///     .return_text("Return the result in a markdown format")
    ///     .guard(PolicyTag::SexualContent)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(descriptor.inputs().len(), 1);
    /// ```
    pub fn builder(prompt_text: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder {
            prompt_text: prompt_text.into(),
            inputs: Vec::new(),
            return_shape: None,
            safety_policy: BTreeSet::new(),
        }
    }

    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    pub fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    pub fn return_shape(&self) -> Option<&ReturnShape> {
        self.return_shape.as_ref()
    }

    pub fn safety_policy(&self) -> &BTreeSet<PolicyTag> {
        &self.safety_policy
    }

    /// Look up an input declaration by key.
    pub fn input(&self, key: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|spec| spec.key == key)
    }
}

/// Builder for [`TemplateDescriptor`].
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    prompt_text: String,
    inputs: Vec<InputSpec>,
    return_shape: Option<ReturnShape>,
    safety_policy: BTreeSet<PolicyTag>,
}

impl TemplateBuilder {
    /// Declare one input.
    pub fn input(mut self, spec: InputSpec) -> Self {
        self.inputs.push(spec);
        self
    }

    /// Declare several inputs, keeping their order.
    pub fn inputs(mut self, specs: impl IntoIterator<Item = InputSpec>) -> Self {
        self.inputs.extend(specs);
        self
    }

    /// Ask for a free-form answer shaped by `instruction`.
    pub fn return_text(self, instruction: impl Into<String>) -> Self {
        self.return_shape(ReturnShape::Text(instruction.into()))
    }

    /// Ask for a structured answer with one entry per step.
    pub fn return_steps(self, steps: impl IntoIterator<Item = StepSpec>) -> Self {
        self.return_shape(ReturnShape::Steps(steps.into_iter().collect()))
    }

    pub fn return_shape(mut self, shape: ReturnShape) -> Self {
        self.return_shape = Some(shape);
        self
    }

    fn maybe_return_shape(mut self, shape: Option<ReturnShape>) -> Self {
        self.return_shape = shape;
        self
    }

    /// Add a content-safety policy tag.
    pub fn guard(mut self, tag: PolicyTag) -> Self {
        self.safety_policy.insert(tag);
        self
    }

    pub fn guards(mut self, tags: impl IntoIterator<Item = PolicyTag>) -> Self {
        self.safety_policy.extend(tags);
        self
    }

    /// Validate and freeze the descriptor.
    ///
    /// # Errors
    /// Returns `AppError::Validation` when the prompt text is blank, an input
    /// key is repeated or is not a valid placeholder name, or a placeholder
    /// has no declared input.
    pub fn build(self) -> AppResult<TemplateDescriptor> {
        if self.prompt_text.trim().is_empty() {
            return Err(AppError::Validation(
                "Prompt text cannot be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.inputs {
            if spec.key.trim().is_empty() {
                return Err(AppError::Validation(
                    "Input key cannot be empty".to_string(),
                ));
            }
            if !is_placeholder_name(&spec.key) {
                return Err(AppError::Validation(format!(
                    "Input key '{}' must contain only letters, digits and underscores",
                    spec.key
                )));
            }
            if !seen.insert(spec.key.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate input key: {}",
                    spec.key
                )));
            }
        }

        if let Some(ReturnShape::Text(ref text)) = self.return_shape {
            if text.trim().is_empty() {
                return Err(AppError::Validation(
                    "Return prompt cannot be empty".to_string(),
                ));
            }
        }

        let referenced = placeholders(&self.prompt_text);
        if let Some(undeclared) = referenced.iter().find(|name| !seen.contains(name.as_str())) {
            return Err(AppError::Validation(format!(
                "Placeholder {{{}}} has no matching input",
                undeclared
            )));
        }

        for spec in &self.inputs {
            if !referenced.contains(&spec.key) {
                tracing::warn!(
                    "Input '{}' is declared but never used in the prompt text",
                    spec.key
                );
            }
        }

        Ok(TemplateDescriptor {
            prompt_text: self.prompt_text,
            inputs: self.inputs,
            return_shape: self.return_shape,
            safety_policy: self.safety_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_story_descriptor() {
        let descriptor = TemplateDescriptor::builder("Tell me a story about {about}")
            .input(InputSpec::new("about").with_default("Leaning Tower of Pisa"))
            .return_text("Return the result in a markdown format")
            .guard(PolicyTag::SexualContent)
            .guard(PolicyTag::Defamation)
            .build()
            .unwrap();

        assert_eq!(descriptor.prompt_text(), "Tell me a story about {about}");
        assert_eq!(descriptor.inputs().len(), 1);
        assert!(!descriptor.input("about").unwrap().is_required());
        assert_eq!(descriptor.safety_policy().len(), 2);
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let result = TemplateDescriptor::builder("   ").build();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = TemplateDescriptor::builder("How to cook {dish}")
            .input(InputSpec::new("dish"))
            .input(InputSpec::new("dish").optional())
            .build();

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("dish")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_placeholder_rejected() {
        let result = TemplateDescriptor::builder("How to cook {dish} for {guests}")
            .input(InputSpec::new("dish"))
            .build();

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("{guests}")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_word_input_key_rejected() {
        let result = TemplateDescriptor::builder("Greet {first-name}")
            .input(InputSpec::new("first-name"))
            .build();

        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("first-name")),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_braced_non_word_text_is_not_a_placeholder() {
        let descriptor = TemplateDescriptor::builder("Greet {first-name} as {name}")
            .input(InputSpec::new("name"))
            .build()
            .unwrap();
        assert_eq!(descriptor.inputs().len(), 1);
    }

    #[test]
    fn test_unused_input_is_not_an_error() {
        let result = TemplateDescriptor::builder("How to cook {dish}")
            .input(InputSpec::new("dish"))
            .input(InputSpec::new("cuisine").optional())
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_policy_tag_parsing() {
        assert_eq!(
            "sexual_content".parse::<PolicyTag>().unwrap(),
            PolicyTag::SexualContent
        );
        assert_eq!(
            "Suicide-Self-Harm".parse::<PolicyTag>().unwrap(),
            PolicyTag::SuicideSelfHarm
        );
        assert!("profanity".parse::<PolicyTag>().is_err());

        for tag in PolicyTag::ALL {
            assert_eq!(tag.as_str().parse::<PolicyTag>().unwrap(), tag);
        }
    }

    #[test]
    fn test_descriptor_deserialization() {
        let yaml = r#"
prompt: "How to cook {dish}"
inputs:
  - key: dish
returnPrompt:
  - step: step counter
    instructions: details of this step
promptGuard: [privacy]
"#;

        let descriptor: TemplateDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(descriptor.inputs(), &[InputSpec::new("dish")]);
        assert_eq!(
            descriptor.return_shape(),
            Some(&ReturnShape::Steps(vec![StepSpec::new(
                "step counter",
                "details of this step"
            )]))
        );
        assert!(descriptor.safety_policy().contains(&PolicyTag::Privacy));
    }

    #[test]
    fn test_deserialization_runs_validation() {
        let yaml = r#"
prompt: "How to cook {dish}"
inputs: []
"#;
        let result: Result<TemplateDescriptor, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_return_shape_serializes_as_string() {
        let descriptor = TemplateDescriptor::builder("Summarize {text}")
            .input(InputSpec::new("text"))
            .return_text("Return bullet points")
            .build()
            .unwrap();

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["returnPrompt"], "Return bullet points");
        assert!(json.get("promptGuard").is_none());
    }
}
