//! Arguments shared by several commands.

use clap::Args;
use promptctl_core::{config::AppConfig, AppError, AppResult};
use promptctl_prompt::{load_template, load_template_file, InputValues, TemplateDefinition};
use std::path::PathBuf;

/// Where to read a template from.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Template ID under .promptctl/templates/
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub template: Option<String>,

    /// Read the template from a YAML file instead
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl TemplateArgs {
    /// Load and validate the selected template.
    pub fn load(&self, config: &AppConfig) -> AppResult<TemplateDefinition> {
        match (&self.template, &self.file) {
            (_, Some(path)) => load_template_file(path),
            (Some(id), None) => load_template(&config.templates_dir(), id),
            (None, None) => Err(AppError::Config(
                "No template given; pass an ID or --file".to_string(),
            )),
        }
    }
}

/// Parse a single `KEY=VALUE` argument.
pub fn parse_key_value(s: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected KEY=VALUE, got '{}'", s))?;

    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("empty key in '{}'", s);
    }

    Ok((key.to_string(), value.to_string()))
}

/// Collect `--set` pairs into input values; a key may appear only once.
pub fn collect_values(pairs: &[(String, String)]) -> AppResult<InputValues> {
    let mut values = InputValues::new();
    for (key, value) in pairs {
        if values.insert(key.clone(), value.clone()).is_some() {
            return Err(AppError::Validation(format!(
                "Input '{}' given more than once",
                key
            )));
        }
    }
    Ok(values)
}

/// Print a JSON document to stdout.
pub fn print_json(value: &serde_json::Value) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("about=Tower of babel").unwrap(),
            ("about".to_string(), "Tower of babel".to_string())
        );
        assert_eq!(
            parse_key_value("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("note=").unwrap(),
            ("note".to_string(), String::new())
        );
        assert!(parse_key_value("about").is_err());
        assert!(parse_key_value(" =x").is_err());
    }

    #[test]
    fn test_collect_values_rejects_duplicates() {
        let pairs = vec![
            ("dish".to_string(), "Pasta".to_string()),
            ("dish".to_string(), "Laksa".to_string()),
        ];
        assert!(matches!(
            collect_values(&pairs),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_template_args_load_from_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp_dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        fs::create_dir_all(config.templates_dir()).unwrap();
        fs::write(
            config.templates_dir().join("dish.yml"),
            "id: dish\nprompt: \"How to cook {dish}\"\ninputs:\n  - key: dish\n",
        )
        .unwrap();

        let args = TemplateArgs {
            template: Some("dish".to_string()),
            file: None,
        };
        let definition = args.load(&config).unwrap();
        assert_eq!(definition.descriptor.prompt_text(), "How to cook {dish}");
    }
}
