//! Direct command handler.
//!
//! Runs a template in a single engine call.

use crate::commands::args::{collect_values, parse_key_value, print_json, TemplateArgs};
use clap::Args;
use promptctl_core::{config::AppConfig, AppResult};
use promptctl_engine::{compose_direct, create_engine};
use promptctl_prompt::resolve;

/// Run a template directly (no registration)
#[derive(Args, Debug)]
pub struct DirectCommand {
    #[command(flatten)]
    pub source: TemplateArgs,

    /// Input value, repeatable
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,

    /// Print the composed request instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DirectCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing direct command");
        tracing::debug!("Direct command options: {:?}", self);

        let definition = self.source.load(config)?;
        let values = collect_values(&self.values)?;

        if self.dry_run {
            let resolved = resolve(&definition.descriptor, &values)?;
            let request = compose_direct(&definition.descriptor, resolved);
            return print_json(&serde_json::to_value(&request)?);
        }

        let client = create_engine(config)?;
        let result = client.run_direct(&definition.descriptor, &values).await?;

        if self.json {
            print_json(&serde_json::json!({
                "mode": "direct",
                "template": definition.id,
                "provider": client.provider_name(),
                "result": result.result,
            }))
        } else {
            println!("{}", result);
            Ok(())
        }
    }
}
