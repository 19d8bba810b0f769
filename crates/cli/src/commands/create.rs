//! Create command handler.
//!
//! Registers a template with the engine and prints the handle.

use crate::commands::args::{print_json, TemplateArgs};
use clap::Args;
use promptctl_core::{config::AppConfig, AppResult};
use promptctl_engine::{compose_create, create_engine};

/// Register a template and print its engine handle
#[derive(Args, Debug)]
pub struct CreateCommand {
    #[command(flatten)]
    pub source: TemplateArgs,

    /// Print the composed request instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl CreateCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing create command");

        let definition = self.source.load(config)?;

        if self.dry_run {
            let request = compose_create(&definition.descriptor);
            return print_json(&serde_json::to_value(&request)?);
        }

        let client = create_engine(config)?;
        let handle = client.create(&definition.descriptor).await?;

        if self.json {
            print_json(&serde_json::json!({
                "mode": "create",
                "template": definition.id,
                "provider": client.provider_name(),
                "handle": handle,
            }))
        } else {
            println!("{}", handle);
            Ok(())
        }
    }
}
