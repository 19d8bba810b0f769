//! Template loader for YAML template definitions.

use crate::types::TemplateDescriptor;
use promptctl_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named template stored in the workspace.
///
/// ```yaml
/// id: story
/// title: Story teller
/// prompt: "Tell me a story about {about}"
/// inputs:
///   - key: about
///     initialValue: Leaning Tower of Pisa
/// returnPrompt: Return the result in a markdown format
/// promptGuard: [sexual_content, defamation]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    /// Unique template identifier
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// The validated descriptor
    #[serde(flatten)]
    pub descriptor: TemplateDescriptor,
}

/// Load a template definition by ID from `templates_dir`.
///
/// Looks for `<id>.yml`, then `<id>.yaml`.
///
/// # Example
/// ```no_run
/// use promptctl_prompt::load_template;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let template = load_template(Path::new(".promptctl/templates"), "story")?;
/// println!("Loaded template: {}", template.title);
/// # Ok(())
/// # }
/// ```
pub fn load_template(templates_dir: &Path, template_id: &str) -> AppResult<TemplateDefinition> {
    let candidates = [
        templates_dir.join(format!("{}.yml", template_id)),
        templates_dir.join(format!("{}.yaml", template_id)),
    ];

    let template_file = candidates.iter().find(|path| path.exists()).ok_or_else(|| {
        AppError::Template(format!(
            "Template '{}' not found in {:?}",
            template_id, templates_dir
        ))
    })?;

    let definition = load_template_file(template_file)?;

    if definition.id != template_id {
        tracing::warn!(
            "Template file {:?} declares id '{}'",
            template_file,
            definition.id
        );
    }

    Ok(definition)
}

/// Load a template definition from an explicit file path.
pub fn load_template_file(path: &Path) -> AppResult<TemplateDefinition> {
    tracing::debug!("Loading template from: {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Template(format!("Failed to read template file {:?}: {}", path, e))
    })?;

    let definition: TemplateDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Template(format!("Failed to parse template {:?}: {}", path, e))
    })?;

    if definition.id.trim().is_empty() {
        return Err(AppError::Template(format!(
            "Template id cannot be empty in {:?}",
            path
        )));
    }

    tracing::info!("Loaded template: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List all template IDs in `templates_dir`, sorted.
pub fn list_templates(templates_dir: &Path) -> AppResult<Vec<String>> {
    if !templates_dir.exists() {
        return Ok(Vec::new());
    }

    let mut template_ids = Vec::new();

    for entry in walkdir::WalkDir::new(templates_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yml") | Some("yaml")
        );
        if path.is_file() && is_yaml {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                template_ids.push(stem.to_string());
            }
        }
    }

    template_ids.sort();
    template_ids.dedup();

    Ok(template_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PolicyTag, ReturnShape};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_template(dir: &Path, file_name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    const STORY: &str = r#"
id: story
title: Story teller
prompt: "Tell me a story about {about}"
inputs:
  - key: about
    optional: false
    initialValue: Leaning Tower of Pisa
returnPrompt: Return the result in a markdown format
promptGuard: [sexual_content, defamation]
"#;

    #[test]
    fn test_load_valid_template() {
        let temp_dir = TempDir::new().unwrap();
        write_template(temp_dir.path(), "story.yml", STORY);

        let template = load_template(temp_dir.path(), "story").unwrap();
        assert_eq!(template.id, "story");
        assert_eq!(template.title, "Story teller");
        assert_eq!(
            template.descriptor.input("about").unwrap().default_value,
            Some("Leaning Tower of Pisa".to_string())
        );
        assert_eq!(
            template.descriptor.return_shape(),
            Some(&ReturnShape::Text(
                "Return the result in a markdown format".to_string()
            ))
        );
        assert!(template
            .descriptor
            .safety_policy()
            .contains(&PolicyTag::Defamation));
    }

    #[test]
    fn test_load_yaml_extension() {
        let temp_dir = TempDir::new().unwrap();
        write_template(
            temp_dir.path(),
            "dish.yaml",
            "id: dish\nprompt: \"How to cook {dish}\"\ninputs:\n  - key: dish\n",
        );

        let template = load_template(temp_dir.path(), "dish").unwrap();
        assert_eq!(template.title, "");
        assert_eq!(template.descriptor.inputs().len(), 1);
    }

    #[test]
    fn test_load_nonexistent_template() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_template(temp_dir.path(), "nonexistent");
        assert!(matches!(result, Err(AppError::Template(_))));
    }

    #[test]
    fn test_load_invalid_descriptor() {
        let temp_dir = TempDir::new().unwrap();
        write_template(
            temp_dir.path(),
            "broken.yml",
            "id: broken\nprompt: \"\"\ninputs: []\n",
        );

        let result = load_template(temp_dir.path(), "broken");
        assert!(matches!(result, Err(AppError::Template(_))));
    }

    #[test]
    fn test_load_empty_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_template(
            temp_dir.path(),
            "anon.yml",
            "id: \"\"\nprompt: \"Write a haiku\"\n",
        );

        assert!(load_template_file(&path).is_err());
    }

    #[test]
    fn test_list_templates() {
        let temp_dir = TempDir::new().unwrap();
        write_template(temp_dir.path(), "story.yml", STORY);
        write_template(
            temp_dir.path(),
            "dish.yaml",
            "id: dish\nprompt: \"How to cook {dish}\"\ninputs:\n  - key: dish\n",
        );
        write_template(temp_dir.path(), "notes.txt", "not a template");

        let templates = list_templates(temp_dir.path()).unwrap();
        assert_eq!(templates, vec!["dish".to_string(), "story".to_string()]);
    }

    #[test]
    fn test_list_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let templates = list_templates(&temp_dir.path().join("absent")).unwrap();
        assert!(templates.is_empty());
    }
}
