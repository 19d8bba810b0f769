//! Templates command handler.
//!
//! Lists and shows the template definitions stored in the workspace.

use crate::commands::args::print_json;
use clap::{Args, Subcommand};
use promptctl_core::{config::AppConfig, AppError, AppResult};
use promptctl_prompt::{list_templates, load_template, placeholders};

/// Inspect workspace templates
#[derive(Args, Debug)]
pub struct TemplatesCommand {
    #[command(subcommand)]
    pub action: TemplatesAction,
}

#[derive(Subcommand, Debug)]
pub enum TemplatesAction {
    /// List template IDs
    List(TemplatesListCommand),
    /// Show one template
    Show(TemplatesShowCommand),
}

/// List template IDs
#[derive(Args, Debug)]
pub struct TemplatesListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TemplatesListCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let templates_dir = config.templates_dir();
        let ids = list_templates(&templates_dir)?;
        tracing::debug!("Found {} templates in {:?}", ids.len(), templates_dir);

        if self.json {
            return print_json(&serde_json::json!({ "templates": ids }));
        }

        if ids.is_empty() {
            eprintln!("No templates found in {:?}", templates_dir);
        }
        for id in ids {
            match load_template(&templates_dir, &id) {
                Ok(def) if !def.title.is_empty() => println!("{}\t{}", id, def.title),
                Ok(_) => println!("{}", id),
                Err(e) => {
                    tracing::warn!("Skipping invalid template {}: {}", id, e);
                    println!("{}\t(invalid)", id);
                }
            }
        }

        Ok(())
    }
}

/// Show one template
#[derive(Args, Debug)]
pub struct TemplatesShowCommand {
    /// Template ID
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TemplatesShowCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let definition = load_template(&config.templates_dir(), &self.id)?;
        let placeholders = placeholders(definition.descriptor.prompt_text());

        if self.json {
            let mut value = serde_json::to_value(&definition)?;
            if let Some(object) = value.as_object_mut() {
                object.insert("placeholders".to_string(), serde_json::json!(placeholders));
            }
            return print_json(&value);
        }

        let yaml = serde_yaml::to_string(&definition)
            .map_err(|e| AppError::Serialization(e.to_string()))?;
        print!("{}", yaml);
        println!("# placeholders: {}", placeholders.join(", "));

        Ok(())
    }
}

impl TemplatesCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            TemplatesAction::List(cmd) => cmd.execute(config).await,
            TemplatesAction::Show(cmd) => cmd.execute(config).await,
        }
    }
}
