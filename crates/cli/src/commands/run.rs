//! Run and batch command handlers.
//!
//! Both run a registered template by handle. `batch` fans out one run per
//! value set and waits for all of them.

use crate::commands::args::{collect_values, parse_key_value, print_json};
use clap::Args;
use futures::future::join_all;
use promptctl_core::{config::AppConfig, AppError, AppResult};
use promptctl_engine::{compose_run, create_engine, EngineClient, EngineHandle, RenderedResult};
use promptctl_prompt::{load_template, resolve, InputValues, ResolvedInputs, TemplateDescriptor};
use std::path::{Path, PathBuf};

/// Run a registered template by handle
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Engine handle printed by `promptctl create`
    pub handle: EngineHandle,

    /// Input value, repeatable
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub values: Vec<(String, String)>,

    /// Check values against this workspace template before sending
    #[arg(short, long)]
    pub template: Option<String>,

    /// Print the composed request instead of sending it
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing run command for handle: {}", self.handle);
        tracing::debug!("Run command options: {:?}", self);

        let values = collect_values(&self.values)?;
        let descriptor = load_descriptor(config, self.template.as_deref())?;

        if self.dry_run {
            let resolved = match descriptor {
                Some(ref descriptor) => resolve(descriptor, &values)?,
                None => ResolvedInputs::unchecked(values),
            };
            let request = compose_run(&self.handle, resolved);
            return print_json(&serde_json::to_value(&request)?);
        }

        let client = create_engine(config)?;
        let result = dispatch(&client, &self.handle, descriptor.as_ref(), &values).await?;

        if self.json {
            print_json(&serde_json::json!({
                "mode": "run",
                "handle": self.handle,
                "provider": client.provider_name(),
                "result": result.result,
            }))
        } else {
            println!("{}", result);
            Ok(())
        }
    }
}

/// Run a registered template once per value set, concurrently
#[derive(Args, Debug)]
pub struct BatchCommand {
    /// Engine handle printed by `promptctl create`
    pub handle: EngineHandle,

    /// YAML file holding a list of value maps
    #[arg(short, long)]
    pub file: PathBuf,

    /// Check values against this workspace template before sending
    #[arg(short, long)]
    pub template: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl BatchCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing batch command for handle: {}", self.handle);

        let value_sets = read_value_sets(&self.file)?;
        let descriptor = load_descriptor(config, self.template.as_deref())?;
        let client = create_engine(config)?;

        let runs = value_sets
            .iter()
            .map(|values| dispatch(&client, &self.handle, descriptor.as_ref(), values));
        let results = join_all(runs).await;

        let total = results.len();
        let mut failed = 0;
        let mut report = Vec::with_capacity(total);

        for (index, outcome) in results.into_iter().enumerate() {
            match outcome {
                Ok(result) => {
                    if !self.json {
                        println!("--- [{}]", index + 1);
                        println!("{}", result);
                    }
                    report.push(serde_json::json!({ "index": index, "result": result.result }));
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("Batch run {} failed: {}", index + 1, e);
                    report.push(serde_json::json!({ "index": index, "error": e.to_string() }));
                }
            }
        }

        if self.json {
            print_json(&serde_json::json!({
                "mode": "batch",
                "handle": self.handle,
                "provider": client.provider_name(),
                "runs": report,
            }))?;
        }

        if failed > 0 {
            return Err(AppError::Other(format!(
                "{} of {} batch runs failed",
                failed, total
            )));
        }

        Ok(())
    }
}

async fn dispatch(
    client: &EngineClient,
    handle: &EngineHandle,
    descriptor: Option<&TemplateDescriptor>,
    values: &InputValues,
) -> AppResult<RenderedResult> {
    match descriptor {
        Some(descriptor) => client.run_checked(handle, descriptor, values).await,
        None => client.run(handle, values).await,
    }
}

fn load_descriptor(
    config: &AppConfig,
    template_id: Option<&str>,
) -> AppResult<Option<TemplateDescriptor>> {
    template_id
        .map(|id| load_template(&config.templates_dir(), id).map(|def| def.descriptor))
        .transpose()
}

/// Read a YAML list of value maps.
fn read_value_sets(path: &Path) -> AppResult<Vec<InputValues>> {
    let contents = std::fs::read_to_string(path)?;
    let value_sets: Vec<InputValues> = serde_yaml::from_str(&contents)?;

    if value_sets.is_empty() {
        return Err(AppError::Validation(format!(
            "No value sets found in {:?}",
            path
        )));
    }

    Ok(value_sets)
}
