//! Request composition.
//!
//! Pure transformations from descriptors and resolved values to engine
//! requests. Nothing here touches the network.

use crate::client::{CreateRequest, DirectRequest, EngineHandle, RunRequest};
use promptctl_prompt::{ResolvedInputs, TemplateDescriptor};

/// Build a direct-mode request carrying the whole template and its values.
pub fn compose_direct(descriptor: &TemplateDescriptor, resolved: ResolvedInputs) -> DirectRequest {
    DirectRequest {
        prompt: descriptor.prompt_text().to_string(),
        inputs: descriptor.inputs().to_vec(),
        return_shape: descriptor.return_shape().cloned(),
        safety_policy: descriptor.safety_policy().iter().copied().collect(),
        input_values: resolved,
    }
}

/// Build a registration request; no values are known yet.
pub fn compose_create(descriptor: &TemplateDescriptor) -> CreateRequest {
    CreateRequest {
        prompt: descriptor.prompt_text().to_string(),
        inputs: descriptor.inputs().to_vec(),
        return_shape: descriptor.return_shape().cloned(),
        safety_policy: descriptor.safety_policy().iter().copied().collect(),
    }
}

/// Build a run request against a registered template.
pub fn compose_run(handle: &EngineHandle, resolved: ResolvedInputs) -> RunRequest {
    RunRequest {
        handle: handle.clone(),
        input_values: resolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptctl_prompt::{resolve, InputSpec, InputValues, PolicyTag, ReturnShape, StepSpec};

    fn story() -> TemplateDescriptor {
        TemplateDescriptor::builder("Tell me a story about {about}")
            .input(InputSpec::new("about").with_default("Leaning Tower of Pisa"))
            .return_text("Return the result in a markdown format")
            .guard(PolicyTag::SexualContent)
            .guard(PolicyTag::Defamation)
            .build()
            .unwrap()
    }

    #[test]
    fn test_compose_direct_carries_everything() {
        let descriptor = story();
        let mut values = InputValues::new();
        values.insert("about".to_string(), "Tower of babel".to_string());
        let resolved = resolve(&descriptor, &values).unwrap();

        let request = compose_direct(&descriptor, resolved);
        assert_eq!(request.prompt, "Tell me a story about {about}");
        assert_eq!(request.inputs, descriptor.inputs());
        assert_eq!(
            request.return_shape,
            Some(ReturnShape::Text(
                "Return the result in a markdown format".to_string()
            ))
        );
        assert_eq!(
            request.safety_policy,
            vec![PolicyTag::Defamation, PolicyTag::SexualContent]
        );
        assert_eq!(request.input_values.get("about"), Some("Tower of babel"));
    }

    #[test]
    fn test_compose_create_has_no_values() {
        let descriptor = TemplateDescriptor::builder("How to cook {dish}")
            .input(InputSpec::new("dish"))
            .return_steps([StepSpec::new("step counter", "details of this step")])
            .build()
            .unwrap();

        let request = compose_create(&descriptor);
        assert_eq!(request.prompt, "How to cook {dish}");
        assert_eq!(request.inputs, vec![InputSpec::new("dish")]);
        assert!(request.safety_policy.is_empty());

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("input_values").is_none());
    }

    #[test]
    fn test_compose_run() {
        let handle = EngineHandle::new("engine-1").unwrap();
        let mut values = InputValues::new();
        values.insert("dish".to_string(), "Pasta".to_string());

        let request = compose_run(&handle, ResolvedInputs::unchecked(values));
        assert_eq!(request.handle, handle);
        assert_eq!(request.input_values.get("dish"), Some("Pasta"));
    }
}
