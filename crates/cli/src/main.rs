//! promptctl
//!
//! Command-line client for a hosted prompt engine: run templates directly,
//! or register them once and run them by handle.

mod commands;

use clap::{Parser, Subcommand};
use commands::{BatchCommand, CreateCommand, DirectCommand, RunCommand, TemplatesCommand};
use promptctl_core::{
    config::{self, AppConfig},
    logging, AppResult,
};
use std::path::PathBuf;

/// promptctl - run prompt templates on a hosted prompt engine
#[derive(Parser, Debug)]
#[command(name = "promptctl")]
#[command(about = "Run prompt templates on a hosted prompt engine", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PROMPTCTL_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PROMPTCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Engine provider (jigsawstack, mock)
    #[arg(short, long, global = true, env = "PROMPTCTL_PROVIDER")]
    provider: Option<String>,

    /// Engine base URL
    #[arg(long, global = true, env = "PROMPTCTL_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a template in one call
    Direct(DirectCommand),

    /// Register a template and print its handle
    Create(CreateCommand),

    /// Run a registered template by handle
    Run(RunCommand),

    /// Run a registered template for every value set in a file
    Batch(BatchCommand),

    /// Inspect workspace templates
    Templates(TemplatesCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // A local .env may carry JIGSAWSTACK_API_KEY and PROMPTCTL_* settings
    config::load_dotenv(&std::env::current_dir()?)?;

    let cli = Cli::parse();

    // Load base configuration from environment and the selected config file
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.base_url,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("promptctl starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.engine.provider);

    let command_name = match &cli.command {
        Commands::Direct(_) => "direct",
        Commands::Create(_) => "create",
        Commands::Run(_) => "run",
        Commands::Batch(_) => "batch",
        Commands::Templates(_) => "templates",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Direct(cmd) => cmd.execute(&config).await,
        Commands::Create(cmd) => cmd.execute(&config).await,
        Commands::Run(cmd) => cmd.execute(&config).await,
        Commands::Batch(cmd) => cmd.execute(&config).await,
        Commands::Templates(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
